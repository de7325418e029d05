use cbor_driver::{
    decode, CborDecDriver, CborError, CborHandle, CborOptions, CborValue, ContainerType, Ext, Major,
    Naked, SliceRead,
};
use chrono::DateTime;

fn opts(f: impl FnOnce(&mut CborOptions)) -> CborHandle {
    let mut o = CborOptions::default();
    f(&mut o);
    CborHandle::from(o)
}

fn dec<'a, 'h>(h: &'h CborHandle, data: &'a [u8]) -> CborDecDriver<'h, SliceRead<'a>> {
    CborDecDriver::new(SliceRead::new(data), h)
}

#[test]
fn integer_widths_matrix() {
    let h = CborHandle::new();
    let cases: [(&[u8], i64); 9] = [
        (&[0x00], 0),
        (&[0x17], 23),
        (&[0x18, 0x18], 24),
        (&[0x19, 0x03, 0xe8], 1000),
        (&[0x1a, 0x00, 0x0f, 0x42, 0x40], 1_000_000),
        (&[0x20], -1),
        (&[0x38, 0x63], -100),
        (&[0x39, 0x03, 0xe7], -1000),
        (&[0x3b, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff], i64::MIN),
    ];
    for (data, expected) in cases {
        assert_eq!(dec(&h, data).decode_i64().unwrap(), expected, "{data:02x?}");
    }
    let max = [0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
    assert_eq!(dec(&h, &max).decode_u64().unwrap(), u64::MAX);
}

#[test]
fn overflow_checked_narrowing_matrix() {
    let h = CborHandle::new();
    assert!(matches!(
        dec(&h, &[0x19, 0x01, 0x00]).decode_uint::<u8>(),
        Err(CborError::IntegerOverflow { value: 256, target: "u8" })
    ));
    assert_eq!(dec(&h, &[0x18, 0xff]).decode_uint::<u8>().unwrap(), 255);
    assert!(matches!(
        dec(&h, &[0x20]).decode_uint::<u32>(),
        Err(CborError::NegativeToUnsigned { target: "u32" })
    ));
    assert!(matches!(
        dec(&h, &[0x38, 0x80]).decode_int::<i8>(),
        Err(CborError::IntegerOverflow { value: -129, target: "i8" })
    ));
    assert_eq!(dec(&h, &[0x38, 0x7f]).decode_int::<i8>().unwrap(), -128);

    let below_i64 = [0x3b, 0x80, 0, 0, 0, 0, 0, 0, 0];
    assert!(matches!(
        dec(&h, &below_i64).decode_i64(),
        Err(CborError::IntegerOverflow { value, target: "i64" }) if value == -1 - (1i128 << 63)
    ));
    let above_i64 = [0x1b, 0x80, 0, 0, 0, 0, 0, 0, 0];
    assert!(matches!(
        dec(&h, &above_i64).decode_int::<i32>(),
        Err(CborError::IntegerOverflow { target: "i32", .. })
    ));
}

#[test]
fn float_widths_matrix() {
    let h = CborHandle::new();
    let cases: [(&[u8], f64); 7] = [
        (&[0xf9, 0x00, 0x00], 0.0),
        (&[0xf9, 0x3c, 0x00], 1.0),
        (&[0xf9, 0x3e, 0x00], 1.5),
        (&[0xf9, 0x7b, 0xff], 65504.0),
        (&[0xf9, 0x00, 0x01], 5.960464477539063e-8),
        (&[0xfa, 0x47, 0xc3, 0x50, 0x00], 100000.0),
        (&[0xfb, 0x3f, 0xf1, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a], 1.1),
    ];
    for (data, expected) in cases {
        assert_eq!(dec(&h, data).decode_f64().unwrap(), expected, "{data:02x?}");
    }
    assert_eq!(dec(&h, &[0xf9, 0x7c, 0x00]).decode_f64().unwrap(), f64::INFINITY);
    assert_eq!(dec(&h, &[0xf9, 0xfc, 0x00]).decode_f64().unwrap(), f64::NEG_INFINITY);
    assert!(dec(&h, &[0xf9, 0x7e, 0x00]).decode_f64().unwrap().is_nan());
    assert_eq!(dec(&h, &[0x19, 0x03, 0xe8]).decode_f64().unwrap(), 1000.0);

    let huge = [0xfb, 0x7e, 0x37, 0xe4, 0x3c, 0x88, 0x00, 0x75, 0x9c];
    assert!(matches!(
        dec(&h, &huge).decode_f32(),
        Err(CborError::IntegerOverflow { target: "f32", .. })
    ));
    assert!(matches!(
        dec(&h, &[0x61, b'1']).decode_f64(),
        Err(CborError::InvalidDescriptor { context: "float", bd: 0x61, desc: "string" })
    ));
}

#[test]
fn bool_and_nil_probes() {
    let h = CborHandle::new();
    let mut d = dec(&h, &[0xf5, 0xf4, 0xf7, 0xf6, 0x01]);
    assert!(d.decode_bool().unwrap());
    assert!(!d.decode_bool().unwrap());
    assert!(d.try_decode_as_nil().unwrap());
    assert!(d.try_decode_as_nil().unwrap());
    assert!(!d.try_decode_as_nil().unwrap());
    assert!(matches!(
        d.decode_bool(),
        Err(CborError::InvalidDescriptor { context: "bool", bd: 0x01, .. })
    ));
}

#[test]
fn indefinite_map_drains_to_break() {
    let h = CborHandle::new();
    let data = [0xbf, 0x61, b'a', 0x01, 0x61, b'b', 0x02, 0xff, 0x07];
    let mut d = dec(&h, &data);
    assert_eq!(d.read_map_start().unwrap(), None);
    let mut pairs = Vec::new();
    while !d.check_break().unwrap() {
        let k = d.decode_string().unwrap().unwrap();
        let v = d.decode_u64().unwrap();
        pairs.push((k, v));
    }
    assert_eq!(pairs, [("a".to_owned(), 1), ("b".to_owned(), 2)]);
    assert_eq!(d.get_ref().position(), 8);
    assert_eq!(d.decode_u64().unwrap(), 7);
}

#[test]
fn container_starts_and_mismatches() {
    let h = CborHandle::new();
    assert_eq!(dec(&h, &[0x98, 0x1e]).read_array_start().unwrap(), Some(30));
    assert_eq!(dec(&h, &[0xa2]).read_map_start().unwrap(), Some(2));
    assert_eq!(dec(&h, &[0x9f]).read_array_start().unwrap(), None);

    let err = dec(&h, &[0xa0]).read_array_start().unwrap_err();
    assert!(matches!(
        err,
        CborError::UnexpectedMajor { expected: Major::Array, got: Major::Map, bd: 0xa0, .. }
    ));
    assert_eq!(
        err.to_string(),
        "error reading array; expected major type 4 (array), got 5 (map) from descriptor 0xa0/map"
    );
}

#[test]
fn container_type_matrix() {
    let h = CborHandle::new();
    let cases: [(u8, ContainerType); 11] = [
        (0xf6, ContainerType::Nil),
        (0x40, ContainerType::Bytes),
        (0x5f, ContainerType::Bytes),
        (0x60, ContainerType::String),
        (0x7f, ContainerType::String),
        (0x80, ContainerType::Array),
        (0x9f, ContainerType::Array),
        (0xa0, ContainerType::Map),
        (0xbf, ContainerType::Map),
        (0x01, ContainerType::Unset),
        (0xf7, ContainerType::Unset),
    ];
    for (bd, expected) in cases {
        let data = [bd];
        let mut d = dec(&h, &data);
        assert_eq!(d.container_type().unwrap(), expected, "{bd:#04x}");
        // The query does not consume.
        assert_eq!(d.get_ref().position(), 1);
        d.uncache().unwrap();
        assert_eq!(d.get_ref().position(), 0);
    }
}

#[test]
fn strings_and_bytes_matrix() {
    let h = CborHandle::new();
    assert_eq!(dec(&h, &[0x44, 1, 2, 3, 4]).decode_bytes().unwrap(), Some(vec![1, 2, 3, 4]));
    assert_eq!(dec(&h, &[0x40]).decode_bytes().unwrap(), Some(vec![]));
    assert_eq!(dec(&h, &[0xf6]).decode_bytes().unwrap(), None);
    assert_eq!(dec(&h, &[0xf7]).decode_string().unwrap(), None);
    assert_eq!(
        dec(&h, &[0x5f, 0x42, 1, 2, 0x43, 3, 4, 5, 0xff]).decode_bytes().unwrap(),
        Some(vec![1, 2, 3, 4, 5])
    );
    assert_eq!(dec(&h, &[0x5f, 0xff]).decode_bytes().unwrap(), Some(vec![]));
    assert_eq!(
        dec(&h, &[0x7f, 0x65, b's', b't', b'r', b'e', b'a', 0x64, b'm', b'i', b'n', b'g', 0xff])
            .decode_string()
            .unwrap()
            .as_deref(),
        Some("streaming")
    );
    assert!(matches!(
        dec(&h, &[0x62, 0xff, 0xfe]).decode_string(),
        Err(CborError::InvalidUtf8)
    ));
    assert!(matches!(
        dec(&h, &[0x01]).decode_string(),
        Err(CborError::UnexpectedMajor { expected: Major::String, got: Major::Uint, .. })
    ));

    let mut buf = vec![0xee; 3];
    assert!(dec(&h, &[0x41, 0x09]).decode_bytes_into(&mut buf).unwrap());
    assert_eq!(buf, [0x09]);
    assert!(!dec(&h, &[0xf6]).decode_bytes_into(&mut buf).unwrap());
    assert!(buf.is_empty());
}

#[test]
fn byte_range_arrays_decode_as_bytes() {
    let h = CborHandle::new();
    assert_eq!(
        dec(&h, &[0x83, 0x01, 0x18, 0xff, 0x00]).decode_bytes().unwrap(),
        Some(vec![1, 255, 0])
    );
    assert_eq!(dec(&h, &[0x9f, 0x07, 0x08, 0xff]).decode_bytes().unwrap(), Some(vec![7, 8]));
    assert!(matches!(
        dec(&h, &[0x81, 0x19, 0x01, 0x00]).decode_bytes(),
        Err(CborError::IntegerOverflow { value: 256, target: "u8" })
    ));
    // Text never takes the array path.
    assert!(matches!(
        dec(&h, &[0x81, 0x01]).decode_string(),
        Err(CborError::UnexpectedMajor { expected: Major::String, got: Major::Array, .. })
    ));
}

#[test]
fn borrowed_decodes() {
    let h = CborHandle::new();
    let data = [0x43, 1, 2, 3, 0x5f, 0x41, 4, 0xff];
    let mut d = dec(&h, &data);
    let first = d.decode_bytes_borrowed().unwrap().unwrap();
    assert!(matches!(first, std::borrow::Cow::Borrowed(&[1, 2, 3])));
    let second = d.decode_bytes_borrowed().unwrap().unwrap();
    assert!(matches!(second, std::borrow::Cow::Owned(ref v) if v == &[4]));
    assert!(matches!(
        dec(&h, &[0x62, 0xc3, 0x28]).decode_str_borrowed(),
        Err(CborError::InvalidUtf8)
    ));
}

#[test]
fn three_nested_unknown_tags_are_skipped() {
    let skip = opts(|o| o.skip_unexpected_tags = true);
    let tagged = [0xd8, 0x64, 0xd8, 0x65, 0xc6, 0x82, 0x01, 0x02];
    let plain = [0x82, 0x01, 0x02];
    assert_eq!(decode(&tagged, &skip).unwrap(), decode(&plain, &skip).unwrap());

    let mut d = dec(&skip, &tagged);
    assert_eq!(d.decode_naked().unwrap(), Naked::Array);
    assert_eq!(d.read_array_start().unwrap(), Some(2));

    // Typed decodes skip the same way.
    let mut d = dec(&skip, &[0xd8, 0x64, 0xc6, 0x05]);
    assert_eq!(d.decode_u64().unwrap(), 5);

    let keep = CborHandle::new();
    let mut d = dec(&keep, &tagged);
    assert_eq!(d.decode_naked().unwrap(), Naked::Tag(100));
    assert_eq!(d.decode_naked().unwrap(), Naked::Tag(101));
    assert_eq!(d.decode_naked().unwrap(), Naked::Tag(6));
    assert!(matches!(d.decode_u64(), Err(CborError::UnexpectedMajor { got: Major::Array, .. })));
}

#[test]
fn self_describe_prefix() {
    let data = [0xd9, 0xd9, 0xf7, 0x01];
    let skip = opts(|o| o.skip_unexpected_tags = true);
    assert_eq!(decode(&data, &skip).unwrap(), CborValue::Uint(1));
    assert_eq!(
        decode(&data, &CborHandle::new()).unwrap(),
        CborValue::tag(55799, CborValue::Uint(1))
    );
}

#[test]
fn time_decode_matrix() {
    let h = CborHandle::new();
    let expected = DateTime::from_timestamp(1_363_896_240, 0).unwrap();

    let mut rfc = vec![0xc0, 0x74];
    rfc.extend_from_slice(b"2013-03-21T20:04:00Z");
    assert_eq!(dec(&h, &rfc).decode_time().unwrap(), Some(expected));
    assert_eq!(
        dec(&h, &[0xc1, 0x1a, 0x51, 0x4b, 0x67, 0xb0]).decode_time().unwrap(),
        Some(expected)
    );
    assert_eq!(
        dec(&h, &[0xc1, 0xfb, 0x41, 0xd4, 0x52, 0xd9, 0xec, 0x20, 0x00, 0x00])
            .decode_time()
            .unwrap(),
        DateTime::from_timestamp(1_363_896_240, 500_000_000)
    );
    assert_eq!(
        dec(&h, &[0xc1, 0xf9, 0x3c, 0x00]).decode_time().unwrap(),
        DateTime::from_timestamp(1, 0)
    );
    assert_eq!(dec(&h, &[0xf6]).decode_time().unwrap(), None);

    let mut offset = vec![0xc0, 0x78, 0x19];
    offset.extend_from_slice(b"2013-03-21T22:04:00+02:00");
    assert_eq!(dec(&h, &offset).decode_time().unwrap(), Some(expected));

    // Decoded times are rounded to the microsecond.
    let mut nanos = vec![0xc0, 0x78, 0x1e];
    nanos.extend_from_slice(b"2013-03-21T20:04:00.000000501Z");
    assert_eq!(
        dec(&h, &nanos).decode_time().unwrap(),
        DateTime::from_timestamp(1_363_896_240, 1_000)
    );

    assert!(matches!(
        dec(&h, &[0xc2, 0x40]).decode_time(),
        Err(CborError::InvalidTimeTag(2))
    ));
    assert!(matches!(
        dec(&h, &[0xc0, 0x63, b'b', b'a', b'd']).decode_time(),
        Err(CborError::InvalidTimestamp(_))
    ));
    assert!(matches!(
        dec(&h, &[0x01]).decode_time(),
        Err(CborError::UnexpectedMajor { expected: Major::Tag, .. })
    ));

    // Naked decode collapses tags 0 and 1 into times.
    assert_eq!(
        dec(&h, &[0xc1, 0x1a, 0x51, 0x4b, 0x67, 0xb0]).decode_naked().unwrap(),
        Naked::Time(expected)
    );
}

#[test]
fn ext_decode_matrix() {
    let h = CborHandle::new();
    assert_eq!(
        dec(&h, &[0xd8, 0x2b, 0x01]).decode_ext(42, None).unwrap(),
        CborValue::tag(43, CborValue::Uint(1))
    );
    assert!(matches!(
        dec(&h, &[0xd8, 0x2b, 0x01]).decode_ext(42, Some(&Ext::SelfDescribing)),
        Err(CborError::ExtensionTagMismatch { expected: 42, got: 43 })
    ));
    assert_eq!(
        dec(&h, &[0xd8, 0x2a, 0x61, b'x']).decode_ext(42, Some(&Ext::SelfDescribing)).unwrap(),
        CborValue::Text("x".into())
    );
    assert!(matches!(
        dec(&h, &[0x01]).decode_ext(42, None),
        Err(CborError::UnexpectedMajor { expected: Major::Tag, got: Major::Uint, .. })
    ));
}

#[test]
fn naked_options_matrix() {
    let plain = CborHandle::new();
    assert_eq!(dec(&plain, &[0x05]).decode_naked().unwrap(), Naked::Uint(5));
    assert_eq!(dec(&plain, &[0x24]).decode_naked().unwrap(), Naked::Int(-5));
    assert_eq!(dec(&plain, &[0x42, b'h', b'i']).decode_naked().unwrap(), Naked::Bytes(b"hi".to_vec()));
    assert_eq!(dec(&plain, &[0xf7]).decode_naked().unwrap(), Naked::Nil);
    assert_eq!(dec(&plain, &[0xf4]).decode_naked().unwrap(), Naked::Bool(false));
    assert_eq!(dec(&plain, &[0xf9, 0x3e, 0x00]).decode_naked().unwrap(), Naked::Float(1.5));
    assert_eq!(dec(&plain, &[0xa0]).decode_naked().unwrap(), Naked::Map);

    let signed = opts(|o| o.signed_integer = true);
    assert_eq!(dec(&signed, &[0x05]).decode_naked().unwrap(), Naked::Int(5));

    let raw = opts(|o| o.raw_to_string = true);
    assert_eq!(
        dec(&raw, &[0x42, b'h', b'i']).decode_naked().unwrap(),
        Naked::Text("hi".into())
    );

    for bd in [0xf8, 0xe0, 0xff, 0xfc] {
        let data = [bd, 0x00];
        assert!(
            matches!(dec(&plain, &data).decode_naked(), Err(CborError::InvalidDescriptor { context: "naked", .. })),
            "{bd:#04x}"
        );
    }
}

#[test]
fn truncated_input_matrix() {
    let h = CborHandle::new();
    let cases: [&[u8]; 7] = [
        &[],
        &[0x19, 0x01],
        &[0x44, 1, 2],
        &[0x5f, 0x42, 1, 2],
        &[0x82, 0x01],
        &[0xbf, 0x01],
        &[0xfb, 0x3f, 0xf1],
    ];
    for data in cases {
        assert!(
            matches!(decode(data, &h), Err(CborError::UnexpectedEof)),
            "{data:02x?}"
        );
    }
}
