//! Der binäre Objekt-Strom der Alt-Formate.
//!
//! Alle drei Legacy-Generationen teilen dieselbe selbstbeschreibende
//! Kodierung: ein Block beginnt mit einer u16-Anzahl, jedes Objekt trägt
//! seinen Typnamen, jedes Feld seinen Namen und einen Werte-Tag. Alle
//! Zahlen sind Little-Endian, Strings längen-präfixiert (u16) in UTF-8.

use anyhow::{bail, Context, Result};
use glam::Vec3;

const TAG_U16: u8 = 0;
const TAG_I32: u8 = 1;
const TAG_F32: u8 = 2;
const TAG_BOOL: u8 = 3;
const TAG_STR: u8 = 4;
const TAG_VEC3: u8 = 5;
const TAG_OBJECT: u8 = 6;
const TAG_ARRAY: u8 = 7;

/// Ein getaggter Wert des Objekt-Stroms.
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyValue {
    U16(u16),
    I32(i32),
    F32(f32),
    Bool(bool),
    Str(String),
    Vec3(Vec3),
    Object(LegacyObject),
    Array(Vec<LegacyValue>),
}

impl LegacyValue {
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            LegacyValue::U16(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            LegacyValue::I32(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            LegacyValue::F32(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            LegacyValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LegacyValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            LegacyValue::Vec3(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&LegacyObject> {
        match self {
            LegacyValue::Object(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[LegacyValue]> {
        match self {
            LegacyValue::Array(values) => Some(values),
            _ => None,
        }
    }
}

/// Ein serialisiertes Objekt: Typname plus benannte Felder.
///
/// Felder behalten ihre Strom-Reihenfolge; unbekannte Feldnamen werden
/// beim Zusammenbau schlicht nicht abgefragt.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyObject {
    pub type_name: String,
    pub fields: Vec<(String, LegacyValue)>,
}

impl LegacyObject {
    /// Leeres Objekt mit Typnamen (Baustein für Test-Fixtures).
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            fields: Vec::new(),
        }
    }

    /// Hängt ein Feld an (Builder-Stil).
    pub fn with_field(mut self, name: &str, value: LegacyValue) -> Self {
        self.fields.push((name.to_string(), value));
        self
    }

    /// Erster Feldwert mit dem gegebenen Namen.
    pub fn field(&self, name: &str) -> Option<&LegacyValue> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, value)| value)
    }
}

/// Liest einen kompletten Block als Liste von Top-Level-Objekten.
pub fn read_objects(data: &[u8]) -> Result<Vec<LegacyObject>> {
    let mut reader = ByteReader::new(data);
    let count = reader.read_u16()? as usize;

    let mut objects = Vec::with_capacity(count);
    for index in 0..count {
        let object = reader
            .read_object()
            .with_context(|| format!("Objekt {} von {} unlesbar", index + 1, count))?;
        objects.push(object);
    }

    if reader.remaining() > 0 {
        log::warn!(
            "{} Bytes am Ende des Legacy-Blocks werden ignoriert",
            reader.remaining()
        );
    }

    Ok(objects)
}

/// Schreibt Objekte als Block (Gegenstück zu [`read_objects`]).
pub fn write_objects(objects: &[LegacyObject]) -> Vec<u8> {
    let mut out = Vec::new();
    write_u16(&mut out, objects.len() as u16);
    for object in objects {
        write_object(&mut out, object);
    }
    out
}

fn write_object(out: &mut Vec<u8>, object: &LegacyObject) {
    write_string(out, &object.type_name);
    write_u16(out, object.fields.len() as u16);
    for (name, value) in &object.fields {
        write_string(out, name);
        write_value(out, value);
    }
}

fn write_value(out: &mut Vec<u8>, value: &LegacyValue) {
    match value {
        LegacyValue::U16(v) => {
            out.push(TAG_U16);
            write_u16(out, *v);
        }
        LegacyValue::I32(v) => {
            out.push(TAG_I32);
            out.extend_from_slice(&v.to_le_bytes());
        }
        LegacyValue::F32(v) => {
            out.push(TAG_F32);
            out.extend_from_slice(&v.to_le_bytes());
        }
        LegacyValue::Bool(v) => {
            out.push(TAG_BOOL);
            out.push(u8::from(*v));
        }
        LegacyValue::Str(v) => {
            out.push(TAG_STR);
            write_string(out, v);
        }
        LegacyValue::Vec3(v) => {
            out.push(TAG_VEC3);
            out.extend_from_slice(&v.x.to_le_bytes());
            out.extend_from_slice(&v.y.to_le_bytes());
            out.extend_from_slice(&v.z.to_le_bytes());
        }
        LegacyValue::Object(v) => {
            out.push(TAG_OBJECT);
            write_object(out, v);
        }
        LegacyValue::Array(values) => {
            out.push(TAG_ARRAY);
            write_u16(out, values.len() as u16);
            for element in values {
                write_value(out, element);
            }
        }
    }
}

fn write_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn write_string(out: &mut Vec<u8>, value: &str) {
    write_u16(out, value.len() as u16);
    out.extend_from_slice(value.as_bytes());
}

/// Lese-Cursor über einem Byte-Puffer.
struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let Some(end) = self.pos.checked_add(len) else {
            bail!("Längenangabe läuft über");
        };
        if end > self.data.len() {
            bail!("Unerwartetes Ende des Legacy-Blocks bei Byte {}", self.pos);
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.read_bytes(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_f32(&mut self) -> Result<f32> {
        let bytes = self.read_bytes(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.read_u16()? as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).context("Ungültige UTF-8-Sequenz im Legacy-Block")
    }

    fn read_object(&mut self) -> Result<LegacyObject> {
        let type_name = self.read_string()?;
        let field_count = self.read_u16()? as usize;

        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            let name = self.read_string()?;
            let value = self
                .read_value()
                .with_context(|| format!("Feld '{}' von {} unlesbar", name, type_name))?;
            fields.push((name, value));
        }

        Ok(LegacyObject { type_name, fields })
    }

    fn read_value(&mut self) -> Result<LegacyValue> {
        let tag = self.read_u8()?;
        match tag {
            TAG_U16 => Ok(LegacyValue::U16(self.read_u16()?)),
            TAG_I32 => Ok(LegacyValue::I32(self.read_i32()?)),
            TAG_F32 => Ok(LegacyValue::F32(self.read_f32()?)),
            TAG_BOOL => Ok(LegacyValue::Bool(self.read_u8()? != 0)),
            TAG_STR => Ok(LegacyValue::Str(self.read_string()?)),
            TAG_VEC3 => {
                let x = self.read_f32()?;
                let y = self.read_f32()?;
                let z = self.read_f32()?;
                Ok(LegacyValue::Vec3(Vec3::new(x, y, z)))
            }
            TAG_OBJECT => Ok(LegacyValue::Object(self.read_object()?)),
            TAG_ARRAY => {
                let count = self.read_u16()? as usize;
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(self.read_value()?);
                }
                Ok(LegacyValue::Array(values))
            }
            other => bail!("Unbekannter Werte-Tag {} im Legacy-Block", other),
        }
    }
}
