use super::typesig::*;

fn ty(bytes: &[u8]) -> TypeDesc {
    decode_type(bytes, 0).expect("valid type")
}

fn func(bytes: &[u8]) -> FunctionSig {
    decode_function(bytes, 0).expect("valid signature")
}

#[test]
fn primitives() {
    assert_eq!(ty(&[tag::BOOL]), TypeDesc::Primitive(PrimitiveKind::Bool));
    assert_eq!(ty(&[tag::INT32]).to_string(), "int");
    assert_eq!(ty(&[tag::CHAR8]).to_string(), "char");
    assert_eq!(ty(&[tag::ANY]).to_string(), "any");
    assert_eq!(ty(&[tag::TOP_FUNCTION]).to_string(), "Function");
    assert!(PrimitiveKind::Float32.is_float());
    assert!(!PrimitiveKind::Int32.is_float());
}

#[test]
fn const_prefix_is_dropped() {
    assert_eq!(ty(&[tag::CONST, tag::FLOAT32]), ty(&[tag::FLOAT32]));
}

#[test]
fn arrays() {
    assert_eq!(ty(&[tag::FIXED_ARRAY, 4, tag::INT32]).to_string(), "int[4]");
    assert_eq!(ty(&[tag::ARRAY, tag::CHAR8]).to_string(), "char[]");
    assert_eq!(
        ty(&[tag::ARRAY, tag::FIXED_ARRAY, 0x80, 0x01, tag::FLOAT32]).to_string(),
        "float[128][]"
    );
}

#[test]
fn named_references_stay_unresolved() {
    assert_eq!(
        ty(&[tag::ENUM, 3]),
        TypeDesc::Named {
            kind: NamedKind::Enum,
            index: 3
        }
    );
    assert_eq!(ty(&[tag::CLASSDEF, 0]).to_string(), "classdef#0");
    assert_eq!(ty(&[tag::ENUM_STRUCT, 2]).to_string(), "enumstruct#2");
}

#[test]
fn function_signatures() {
    let sig = func(&[2, tag::VOID, tag::INT32, tag::BY_REF, tag::FLOAT32]);
    assert_eq!(sig.ret, None);
    assert!(!sig.variadic);
    assert_eq!(sig.to_string(), "function void(int, &float)");

    let sig = func(&[1, tag::VARIADIC, tag::INT32, tag::ANY]);
    assert!(sig.variadic);
    assert_eq!(sig.to_string(), "function int(any, ...)");

    assert_eq!(func(&[0, tag::BOOL]).to_string(), "function bool()");
}

#[test]
fn function_typed_value() {
    let t = ty(&[tag::FUNCTION, 1, tag::VOID, tag::TYPEDEF, 5]);
    assert_eq!(t.to_string(), "function void(typedef#5)");
}

#[test]
fn decoding_starts_at_offset() {
    let data = [0xff, 0xff, tag::ARRAY, tag::BOOL];
    assert_eq!(decode_type(&data, 2).unwrap().to_string(), "bool[]");

    let mut decoder = TypeDecoder::new(&data, 2);
    decoder.decode_type().unwrap();
    assert_eq!(decoder.offset(), 4);
}

#[test]
fn unknown_tag_is_an_error() {
    assert_eq!(
        decode_type(&[0, 0, 0x99], 2),
        Err(TypeError::UnknownTag {
            tag: 0x99,
            offset: 2
        })
    );
    assert_eq!(
        decode_function(&[1, tag::VOID, 0x20], 0),
        Err(TypeError::UnknownTag {
            tag: 0x20,
            offset: 2
        })
    );
}

#[test]
fn truncated_signature_is_an_error() {
    assert!(matches!(
        decode_type(&[tag::FIXED_ARRAY], 0),
        Err(TypeError::Read(_))
    ));
    assert!(matches!(
        decode_function(&[3, tag::VOID, tag::INT32], 0),
        Err(TypeError::Read(_))
    ));
}

#[test]
fn deep_nesting_is_rejected() {
    let mut data = vec![tag::ARRAY; 100];
    data.push(tag::INT32);
    assert_eq!(decode_type(&data, 0), Err(TypeError::TooDeep(0)));
}
