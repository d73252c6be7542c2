//! Annotation structures as they appear in class file attributes
//! (JVMS 4.7.16 – 4.7.22), read from and written to a constant pool.

use crate::abi::annotation::{Annotation, ElementPair, ElementValue, TargetInfo, TypeAnnotation, TypePath, TypePathStep};
use crate::abi::descriptor::ParameterAnnotations;

use super::constpool::{Constant, ConstantPool};
use super::cursor::ByteCursor;
use super::error::{ClassFormatError, ClassFormatResult, ConstPoolError, ConstPoolResult};

fn integer(pool: &ConstantPool, index: u16) -> ClassFormatResult<i32> {
    match pool.get(index)? {
        Constant::Integer(v) => Ok(*v),
        _ => Err(ConstPoolError::UnexpectedKind { index, expected: "Integer" }.into()),
    }
}

fn read_pairs(cursor: &mut ByteCursor<'_>, pool: &ConstantPool) -> ClassFormatResult<Vec<ElementPair>> {
    let count = cursor.u2()?;
    let mut elements = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name = pool.get_utf8(cursor.u2()?)?.to_string();
        let value = read_element_value(cursor, pool)?;
        elements.push(ElementPair { name, value });
    }
    Ok(elements)
}

fn read_annotation(cursor: &mut ByteCursor<'_>, pool: &ConstantPool, visible: bool) -> ClassFormatResult<Annotation> {
    let descriptor = pool.get_utf8(cursor.u2()?)?.to_string();
    let elements = read_pairs(cursor, pool)?;
    Ok(Annotation::new(descriptor, visible, elements))
}

pub(crate) fn read_element_value(cursor: &mut ByteCursor<'_>, pool: &ConstantPool) -> ClassFormatResult<ElementValue> {
    let tag = cursor.u1()?;
    let value = match tag {
        b'B' => ElementValue::Byte(integer(pool, cursor.u2()?)? as i8),
        b'C' => ElementValue::Char(integer(pool, cursor.u2()?)? as u16),
        b'S' => ElementValue::Short(integer(pool, cursor.u2()?)? as i16),
        b'Z' => ElementValue::Boolean(integer(pool, cursor.u2()?)? != 0),
        b'I' => ElementValue::Int(integer(pool, cursor.u2()?)?),
        b'J' => {
            let index = cursor.u2()?;
            match pool.get(index)? {
                Constant::Long(v) => ElementValue::Long(*v),
                _ => return Err(ConstPoolError::UnexpectedKind { index, expected: "Long" }.into()),
            }
        }
        b'F' => {
            let index = cursor.u2()?;
            match pool.get(index)? {
                Constant::Float(v) => ElementValue::Float(*v),
                _ => return Err(ConstPoolError::UnexpectedKind { index, expected: "Float" }.into()),
            }
        }
        b'D' => {
            let index = cursor.u2()?;
            match pool.get(index)? {
                Constant::Double(v) => ElementValue::Double(*v),
                _ => return Err(ConstPoolError::UnexpectedKind { index, expected: "Double" }.into()),
            }
        }
        b's' => ElementValue::String(pool.get_text(cursor.u2()?)?),
        b'e' => {
            let type_descriptor = pool.get_utf8(cursor.u2()?)?.to_string();
            let const_name = pool.get_utf8(cursor.u2()?)?.to_string();
            ElementValue::Enum { type_descriptor, const_name }
        }
        b'c' => ElementValue::Class(pool.get_utf8(cursor.u2()?)?.to_string()),
        b'@' => {
            let descriptor = pool.get_utf8(cursor.u2()?)?.to_string();
            let elements = read_pairs(cursor, pool)?;
            ElementValue::Annotation { descriptor, elements }
        }
        b'[' => {
            let count = cursor.u2()?;
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(read_element_value(cursor, pool)?);
            }
            ElementValue::Array(values)
        }
        other => return Err(ClassFormatError::InvalidElementTag(other as char)),
    };
    Ok(value)
}

/// Body of a `Runtime(In)VisibleAnnotations` attribute.
pub(crate) fn read_annotations(data: &[u8], pool: &ConstantPool, visible: bool) -> ClassFormatResult<Vec<Annotation>> {
    let mut cursor = ByteCursor::new(data);
    let count = cursor.u2()?;
    let mut annotations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        annotations.push(read_annotation(&mut cursor, pool, visible)?);
    }
    Ok(annotations)
}

/// Body of a `Runtime(In)VisibleParameterAnnotations` attribute.
pub(crate) fn read_parameter_annotations(
    data: &[u8],
    pool: &ConstantPool,
    visible: bool,
) -> ClassFormatResult<ParameterAnnotations> {
    let mut cursor = ByteCursor::new(data);
    let count = cursor.u1()? as usize;
    let mut table = ParameterAnnotations::with_count(count);
    for parameter in table.parameters.iter_mut() {
        let annotations = cursor.u2()?;
        for _ in 0..annotations {
            parameter.insert(read_annotation(&mut cursor, pool, visible)?);
        }
    }
    Ok(table)
}

fn read_target_info(target_type: u8, cursor: &mut ByteCursor<'_>) -> ClassFormatResult<TargetInfo> {
    let info = match target_type {
        0x00 | 0x01 => TargetInfo::TypeParameter { index: cursor.u1()? },
        0x10 => TargetInfo::Supertype { index: cursor.u2()? },
        0x11 | 0x12 => TargetInfo::TypeParameterBound { type_parameter: cursor.u1()?, bound: cursor.u1()? },
        0x13..=0x15 => TargetInfo::Empty,
        0x16 => TargetInfo::FormalParameter { index: cursor.u1()? },
        0x17 => TargetInfo::Throws { index: cursor.u2()? },
        other => return Err(ClassFormatError::InvalidTargetType(other)),
    };
    Ok(info)
}

/// Body of a `Runtime(In)VisibleTypeAnnotations` attribute outside `Code`.
pub(crate) fn read_type_annotations(
    data: &[u8],
    pool: &ConstantPool,
    visible: bool,
) -> ClassFormatResult<Vec<TypeAnnotation>> {
    let mut cursor = ByteCursor::new(data);
    let count = cursor.u2()?;
    let mut annotations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let target_type = cursor.u1()?;
        let target_info = read_target_info(target_type, &mut cursor)?;
        let path_length = cursor.u1()?;
        let mut steps = Vec::with_capacity(path_length as usize);
        for _ in 0..path_length {
            steps.push(TypePathStep { kind: cursor.u1()?, argument_index: cursor.u1()? });
        }
        let annotation = read_annotation(&mut cursor, pool, visible)?;
        annotations.push(TypeAnnotation::new(target_type, target_info, TypePath { steps }, annotation));
    }
    Ok(annotations)
}

fn write_u2(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn write_pairs(out: &mut Vec<u8>, pool: &mut ConstantPool, elements: &[ElementPair]) -> ConstPoolResult<()> {
    write_u2(out, elements.len() as u16);
    for pair in elements {
        write_u2(out, pool.add_utf8(&pair.name)?);
        write_element_value(out, pool, &pair.value)?;
    }
    Ok(())
}

fn write_annotation(out: &mut Vec<u8>, pool: &mut ConstantPool, annotation: &Annotation) -> ConstPoolResult<()> {
    write_u2(out, pool.add_utf8(annotation.descriptor())?);
    write_pairs(out, pool, annotation.elements())
}

pub(crate) fn write_element_value(out: &mut Vec<u8>, pool: &mut ConstantPool, value: &ElementValue) -> ConstPoolResult<()> {
    out.push(value.tag());
    match value {
        ElementValue::Byte(v) => write_u2(out, pool.add_integer(*v as i32)?),
        ElementValue::Char(v) => write_u2(out, pool.add_integer(*v as i32)?),
        ElementValue::Short(v) => write_u2(out, pool.add_integer(*v as i32)?),
        ElementValue::Boolean(v) => write_u2(out, pool.add_integer(*v as i32)?),
        ElementValue::Int(v) => write_u2(out, pool.add_integer(*v)?),
        ElementValue::Long(v) => write_u2(out, pool.add_long(*v)?),
        ElementValue::Float(v) => write_u2(out, pool.add_float(*v)?),
        ElementValue::Double(v) => write_u2(out, pool.add_double(*v)?),
        ElementValue::String(s) => write_u2(out, pool.add_text(s)?),
        ElementValue::Class(s) => write_u2(out, pool.add_utf8(s)?),
        ElementValue::Enum { type_descriptor, const_name } => {
            write_u2(out, pool.add_utf8(type_descriptor)?);
            write_u2(out, pool.add_utf8(const_name)?);
        }
        ElementValue::Annotation { descriptor, elements } => {
            write_u2(out, pool.add_utf8(descriptor)?);
            write_pairs(out, pool, elements)?;
        }
        ElementValue::Array(values) => {
            write_u2(out, values.len() as u16);
            for v in values {
                write_element_value(out, pool, v)?;
            }
        }
    }
    Ok(())
}

pub(crate) fn write_annotations<'a, I>(pool: &mut ConstantPool, annotations: I) -> ConstPoolResult<Vec<u8>>
where
    I: ExactSizeIterator<Item = &'a Annotation>,
{
    let mut out = Vec::new();
    write_u2(&mut out, annotations.len() as u16);
    for annotation in annotations {
        write_annotation(&mut out, pool, annotation)?;
    }
    Ok(out)
}

pub(crate) fn write_parameter_annotations(pool: &mut ConstantPool, table: &ParameterAnnotations) -> ConstPoolResult<Vec<u8>> {
    let mut out = vec![table.parameters.len() as u8];
    for parameter in &table.parameters {
        write_u2(&mut out, parameter.len() as u16);
        for annotation in parameter {
            write_annotation(&mut out, pool, annotation)?;
        }
    }
    Ok(out)
}

pub(crate) fn write_type_annotations<'a, I>(pool: &mut ConstantPool, annotations: I) -> ConstPoolResult<Vec<u8>>
where
    I: ExactSizeIterator<Item = &'a TypeAnnotation>,
{
    let mut out = Vec::new();
    write_u2(&mut out, annotations.len() as u16);
    for annotation in annotations {
        out.extend_from_slice(annotation.site_bytes());
        write_annotation(&mut out, pool, annotation.annotation())?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_values_survive_a_pool_round_trip() {
        let nested = ElementValue::Annotation {
            descriptor: "LInner;".to_string(),
            elements: vec![ElementPair::new("flag", ElementValue::Boolean(true))],
        };
        let annotation = Annotation::new(
            "LOuter;",
            true,
            vec![
                ElementPair::new("b", ElementValue::Byte(-3)),
                ElementPair::new("c", ElementValue::Char(0x263a)),
                ElementPair::new("j", ElementValue::Long(1 << 40)),
                ElementPair::new("d", ElementValue::Double(2.5)),
                ElementPair::new("e", ElementValue::Enum { type_descriptor: "LColor;".into(), const_name: "RED".into() }),
                ElementPair::new("k", ElementValue::Class("Ljava/lang/String;".into())),
                ElementPair::new("n", nested),
                ElementPair::new("a", ElementValue::Array(vec![ElementValue::String("x".into()), ElementValue::String("y".into())])),
            ],
        );

        let mut pool = ConstantPool::new();
        let bytes = write_annotations(&mut pool, [&annotation].into_iter()).unwrap();
        let decoded = read_annotations(&bytes, &pool, true).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].elements(), annotation.elements());
        assert_eq!(decoded[0], annotation);
    }

    #[test]
    fn unknown_element_tag_is_rejected() {
        let mut pool = ConstantPool::new();
        let name = pool.add_utf8("LA;").unwrap();
        let value = pool.add_utf8("v").unwrap();
        let mut data = vec![0, 1];
        data.extend_from_slice(&name.to_be_bytes());
        data.extend_from_slice(&[0, 1]);
        data.extend_from_slice(&value.to_be_bytes());
        data.push(b'X');
        assert_eq!(read_annotations(&data, &pool, false), Err(ClassFormatError::InvalidElementTag('X')));
    }

    #[test]
    fn code_level_type_annotation_targets_are_rejected() {
        let pool = ConstantPool::new();
        // one annotation, target 0x43 (instanceof)
        let data = [0, 1, 0x43, 0, 0];
        assert_eq!(read_type_annotations(&data, &pool, true).unwrap_err(), ClassFormatError::InvalidTargetType(0x43));
    }
}
