//! Shared helpers for integration tests: a builder producing byte-exact
//! version 20.2.0.7 mesh files on disk.

use byteorder::{LittleEndian, WriteBytesExt};
use camino::Utf8Path;
use nifbatch::services::nif::NifHeader;
use std::fs;

pub struct MeshFile {
    strings: Vec<String>,
    blocks: Vec<(String, Vec<u8>)>,
}

impl MeshFile {
    pub fn new() -> Self {
        Self {
            strings: Vec::new(),
            blocks: Vec::new(),
        }
    }

    fn intern(&mut self, value: &str) -> u32 {
        if let Some(i) = self.strings.iter().position(|s| s == value) {
            return i as u32;
        }
        self.strings.push(value.to_string());
        (self.strings.len() - 1) as u32
    }

    /// Add a named node block. Payload after the name index is filler.
    pub fn node(mut self, type_name: &str, name: &str) -> Self {
        let name_index = self.intern(name);
        let mut data = Vec::new();
        data.write_u32::<LittleEndian>(name_index).unwrap();
        data.extend_from_slice(&[0u8; 36]);
        self.blocks.push((type_name.to_string(), data));
        self
    }

    /// Add a BSLightingShaderProperty with the given extra-data count.
    pub fn shader(mut self, num_extra: u32, glossiness: f32, specular: f32) -> Self {
        let name_index = self.intern("");
        let mut data = Vec::new();
        data.write_u32::<LittleEndian>(1).unwrap(); // shader type
        data.write_u32::<LittleEndian>(name_index).unwrap();
        data.write_u32::<LittleEndian>(num_extra).unwrap();
        for _ in 0..num_extra {
            data.write_u32::<LittleEndian>(0xFFFF_FFFF).unwrap();
        }
        // controller .. refraction strength
        data.extend_from_slice(&[0u8; 60]);
        data.write_f32::<LittleEndian>(glossiness).unwrap();
        data.extend_from_slice(&[0u8; 12]); // specular color
        data.write_f32::<LittleEndian>(specular).unwrap();
        data.extend_from_slice(&[0u8; 8]); // lighting effects
        self.blocks
            .push(("BSLightingShaderProperty".to_string(), data));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"Gamebryo File Format, Version 20.2.0.7\n");
        out.write_u32::<LittleEndian>(0x1402_0007).unwrap();
        out.push(1); // little endian
        out.write_u32::<LittleEndian>(12).unwrap(); // user version
        out.write_u32::<LittleEndian>(self.blocks.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(100).unwrap(); // bs version
        out.push(0); // author
        out.push(0); // process script
        out.push(0); // export script

        let mut type_names: Vec<String> = Vec::new();
        let mut type_index: Vec<u16> = Vec::new();
        for (type_name, _) in &self.blocks {
            let i = match type_names.iter().position(|t| t == type_name) {
                Some(i) => i,
                None => {
                    type_names.push(type_name.clone());
                    type_names.len() - 1
                }
            };
            type_index.push(i as u16);
        }

        out.write_u16::<LittleEndian>(type_names.len() as u16).unwrap();
        for name in &type_names {
            out.write_u32::<LittleEndian>(name.len() as u32).unwrap();
            out.extend_from_slice(name.as_bytes());
        }
        for &i in &type_index {
            out.write_u16::<LittleEndian>(i).unwrap();
        }
        for (_, data) in &self.blocks {
            out.write_u32::<LittleEndian>(data.len() as u32).unwrap();
        }

        out.write_u32::<LittleEndian>(self.strings.len() as u32).unwrap();
        let max_len = self.strings.iter().map(String::len).max().unwrap_or(0);
        out.write_u32::<LittleEndian>(max_len as u32).unwrap();
        for s in &self.strings {
            out.write_u32::<LittleEndian>(s.len() as u32).unwrap();
            out.extend_from_slice(s.as_bytes());
        }
        out.write_u32::<LittleEndian>(0).unwrap(); // groups

        for (_, data) in &self.blocks {
            out.extend_from_slice(data);
        }
        out
    }

    pub fn write_to(self, path: &Utf8Path) {
        fs::write(path, self.build()).unwrap();
    }
}

/// Read (glossiness, specular strength) out of a shader block, honoring the
/// extra-data shift.
pub fn read_shader_floats(data: &[u8], header: &NifHeader, block: usize) -> (f32, f32) {
    let offset = header.block_offset(block) as usize;
    let num_extra =
        u32::from_le_bytes(data[offset + 8..offset + 12].try_into().unwrap()) as usize;
    let shift = 4 * num_extra;
    let at = |field: usize| {
        f32::from_le_bytes(
            data[offset + field + shift..offset + field + shift + 4]
                .try_into()
                .unwrap(),
        )
    };
    (at(72), at(88))
}
