use super::*;

fn encode_varint(mut value: u32) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let group = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(group);
            return out;
        }
        out.push(group | 0x80);
    }
}

#[test]
fn varint_values() {
    for value in [0u32, 1, 127, 128, 16383, 16384, (1 << 31) - 1] {
        let bytes = encode_varint(value);
        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.read_varint(), Ok(value), "value {value}");
        assert!(r.is_empty());
    }
}

#[test]
fn varint_byte_lengths() {
    assert_eq!(encode_varint(127).len(), 1);
    assert_eq!(encode_varint(128), vec![0x80, 0x01]);
    assert_eq!(encode_varint(16384).len(), 3);
}

#[test]
fn varint_u32_max() {
    let bytes = encode_varint(u32::MAX);
    assert_eq!(bytes.len(), 5);
    assert_eq!(ByteReader::new(&bytes).read_varint(), Ok(u32::MAX));
}

#[test]
fn varint_overflow() {
    let bytes = [0xff, 0xff, 0xff, 0xff, 0x7f];
    assert_eq!(
        ByteReader::new(&bytes).read_varint(),
        Err(ReadError::VarintOverflow(0))
    );
}

#[test]
fn varint_truncated() {
    let bytes = [0x80, 0x80];
    assert!(matches!(
        ByteReader::new(&bytes).read_varint(),
        Err(ReadError::OutOfBounds { offset: 2, .. })
    ));
}

#[test]
fn little_endian_reads() {
    let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xfc, 0xff, 0xff, 0xff];
    let mut r = ByteReader::new(&bytes);
    assert_eq!(r.read_u16(), Ok(0x0201));
    assert_eq!(r.read_u32(), Ok(0x0605_0403));
    assert_eq!(r.read_i32(), Ok(-4));
    assert!(r.read_u8().is_err());
}

#[test]
fn out_of_bounds_reports_position() {
    let bytes = [0u8; 3];
    assert_eq!(
        read_u32_le(&bytes, 0),
        Err(ReadError::OutOfBounds {
            offset: 0,
            len: 4,
            size: 3
        })
    );
    assert!(read_u32_le(&bytes, usize::MAX).is_err());
}

#[test]
fn cstr_reads() {
    let bytes = b"main\0.code\0";
    assert_eq!(read_cstr(bytes, 0), Ok("main"));
    assert_eq!(read_cstr(bytes, 5), Ok(".code"));
    assert_eq!(read_cstr(bytes, 4), Ok(""));

    let mut r = ByteReader::new(bytes);
    assert_eq!(r.read_cstr(), Ok("main"));
    assert_eq!(r.offset(), 5);
}

#[test]
fn cstr_errors() {
    assert_eq!(read_cstr(b"abc", 0), Err(ReadError::UnterminatedString(0)));
    assert_eq!(read_cstr(b"a\xffc\0", 0), Err(ReadError::NotAscii(0)));
    assert!(matches!(
        read_cstr(b"abc\0", 9),
        Err(ReadError::OutOfBounds { offset: 9, .. })
    ));
}

#[test]
fn eat_matches_only_expected_tag() {
    let bytes = [0x73, 0x06];
    let mut r = ByteReader::new(&bytes);
    assert!(!r.eat(0x06));
    assert!(r.eat(0x73));
    assert!(r.eat(0x06));
    assert!(!r.eat(0x06));
}
