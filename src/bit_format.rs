// SPDX-License-Identifier: Apache-2.0

//! Packing of configuration words from a textual bit layout.
//!
//! A layout is written MSB first, e.g. `l0dsooooo`: each `0`/`1` is a literal
//! bit and each letter names a field occupying every position where that
//! letter appears. Whitespace is ignored so long layouts can be grouped.

use crate::PecheckError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: char,
    pub lsb: u32,
    pub width: u32,
}

impl Field {
    pub fn mask(&self) -> u64 {
        if self.width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitFormat {
    bit_count: u32,
    literal_ones: u64,
    fields: Vec<Field>,
}

impl BitFormat {
    pub fn parse(format: &str) -> Result<Self, PecheckError> {
        let bits: Vec<char> = format.chars().filter(|c| !c.is_whitespace()).collect();
        if bits.is_empty() {
            return Err(PecheckError::BitFormat("layout is empty".to_string()));
        }
        if bits.len() > 64 {
            return Err(PecheckError::BitFormat(format!(
                "layout `{}` is {} bits wide; at most 64 are supported",
                format,
                bits.len()
            )));
        }

        let bit_count = bits.len() as u32;
        let mut literal_ones: u64 = 0;
        let mut fields: Vec<Field> = Vec::new();
        let mut prev: Option<char> = None;
        for (i, &c) in bits.iter().enumerate() {
            let position = bit_count - 1 - i as u32;
            match c {
                '0' => {}
                '1' => literal_ones |= 1u64 << position,
                c if c.is_ascii_alphabetic() => {
                    match fields.iter().position(|f| f.name == c) {
                        Some(index) => {
                            if prev != Some(c) {
                                return Err(PecheckError::BitFormat(format!(
                                    "field `{}` is not contiguous in layout `{}`",
                                    c, format
                                )));
                            }
                            fields[index].width += 1;
                            fields[index].lsb = position;
                        }
                        None => fields.push(Field {
                            name: c,
                            lsb: position,
                            width: 1,
                        }),
                    }
                }
                _ => {
                    return Err(PecheckError::BitFormat(format!(
                        "unexpected character `{}` in layout `{}`",
                        c, format
                    )))
                }
            }
            prev = Some(c);
        }

        Ok(BitFormat {
            bit_count,
            literal_ones,
            fields,
        })
    }

    pub fn bit_count(&self) -> u32 {
        self.bit_count
    }

    pub fn field(&self, name: char) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Builds a word from the literal bits plus the given field values.
    /// Values are truncated to their field width; fields not mentioned are
    /// zero.
    pub fn pack(&self, values: &[(char, u64)]) -> Result<u64, PecheckError> {
        let mut word = self.literal_ones;
        for &(name, value) in values {
            let field = self.field(name).ok_or_else(|| {
                PecheckError::BitFormat(format!("no field `{}` in layout", name))
            })?;
            word |= (value & field.mask()) << field.lsb;
        }
        Ok(word)
    }

    pub fn extract(&self, word: u64, name: char) -> Option<u64> {
        self.field(name).map(|f| (word >> f.lsb) & f.mask())
    }
}
