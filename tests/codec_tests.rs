use kartalla::shared::{
    Coordinate,
    codec::{self, decode_integer_list, encode_integer_list, undelta_list},
    polyline,
};

#[test]
fn decode_reference_test() {
    assert_eq!(
        decode_integer_list("#$%1~!$2!~!!$3").unwrap(),
        vec![0, 1, 2, 14, 91, 92, 15, 182, 183, 16]
    );
}

#[test]
fn undelta_test() {
    assert_eq!(undelta_list(&[]).unwrap(), vec![0]);
    assert_eq!(undelta_list(&[10, 1, 11, 3]).unwrap(), vec![0, 10, 11, 22, 25]);
}

#[test]
fn encode_decode_test() {
    let values = vec![0, 5, 90, 91, 92, 181, 182, 1000, 40_000];
    let text = encode_integer_list(&values);
    assert!(text.chars().all(|c| ('!'..='~').contains(&c)));
    assert_eq!(decode_integer_list(&text).unwrap(), values);
}

#[test]
fn delta_test() {
    let values = vec![0, 480, 540, 540, 600];
    assert_eq!(undelta_list(&codec::delta_list(&values).unwrap()).unwrap(), values);
    assert!(codec::delta_list(&[0, 480, 470]).is_err());
}

#[test]
fn unterminated_test() {
    assert_eq!(
        decode_integer_list("#!!").unwrap_err(),
        codec::Error::UnterminatedValue
    );
}

#[test]
fn polyline_reference_test() {
    let points = polyline::decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
    let expected = [(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];
    assert_eq!(points.len(), expected.len());
    for (point, (latitude, longitude)) in points.iter().zip(expected) {
        assert!((point.latitude - latitude).abs() < 1e-9);
        assert!((point.longitude - longitude).abs() < 1e-9);
    }
}

#[test]
fn polyline_encode_test() {
    let points = vec![
        Coordinate::new(38.5, -120.2),
        Coordinate::new(40.7, -120.95),
        Coordinate::new(43.252, -126.453),
    ];
    assert_eq!(polyline::encode(&points).unwrap(), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
}

#[test]
fn polyline_truncated_test() {
    assert!(polyline::decode("_p~iF~ps|U_").is_err());
}
