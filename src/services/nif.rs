// Gamebryo/NetImmerse mesh file support
//
// Parses just enough of the .nif header to classify files by their named
// nodes, and rewrites the two material floats (glossiness and specular
// strength) of every BSLightingShaderProperty block in place. Blocks are
// never resized, so patching is a pure byte-level overwrite at offsets
// computed from the header's block size table.

use byteorder::{LittleEndian, ReadBytesExt};
use camino::Utf8Path;
use std::fs;
use std::io::{Read, Write};
use thiserror::Error;

/// The only file version this tool understands (20.2.0.7, Skyrim and later).
pub const SUPPORTED_VERSION: u32 = 0x1402_0007;

/// Bethesda stream versions with the shader block layout we know how to
/// patch: 83 is Skyrim LE, 100 is Skyrim SE.
pub const SUPPORTED_BS_VERSIONS: [u32; 2] = [83, 100];

/// Block types whose first field is a name index into the header string
/// table. Only these can carry the user-visible node names the keyword
/// filter matches against.
const NAMED_BLOCK_TYPES: [&str; 7] = [
    "NiNode",
    "NiTriShape",
    "NiTriStrips",
    "BSTriShape",
    "BSSubIndexTriShape",
    "BSMeshLODTriShape",
    "BSDynamicTriShape",
];

const SHADER_BLOCK_TYPE: &str = "BSLightingShaderProperty";

// Caps on header-declared counts, so a corrupt file cannot make us
// allocate unbounded memory.
const MAX_BLOCKS: u32 = 1_000_000;
const MAX_BLOCK_TYPES: u16 = 4096;
const MAX_STRINGS: u32 = 1_000_000;
const MAX_STRING_LEN: u32 = 0x8000;

/// Errors produced while reading or patching a mesh file.
#[derive(Debug, Error)]
pub enum NifError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a Gamebryo file (bad magic line)")]
    BadMagic,

    #[error("unsupported file version {0:#010x}")]
    UnsupportedVersion(u32),

    #[error("unsupported Bethesda stream version {0}")]
    UnsupportedBsVersion(u32),

    #[error("big-endian files are not supported")]
    UnsupportedEndian,

    #[error("corrupt header: {0}")]
    CorruptHeader(String),

    #[error("file truncated: block {block} extends past end of file")]
    Truncated { block: usize },
}

/// Parsed .nif header.
///
/// Holds everything needed to locate blocks without understanding their
/// contents: the type table, the per-block type index and size table, and
/// the shared string table that named blocks reference.
#[derive(Debug, Clone)]
pub struct NifHeader {
    pub version: u32,
    pub user_version: u32,
    pub bs_version: u32,
    pub num_blocks: usize,
    pub block_types: Vec<String>,
    pub block_type_index: Vec<u16>,
    pub block_sizes: Vec<u32>,
    pub strings: Vec<String>,
    /// Byte offset of the first block, right after the header.
    pub data_offset: u64,
}

impl NifHeader {
    /// Parse a header from the start of a reader.
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self, NifError> {
        let mut r = HeaderReader::new(reader);

        let magic = r.read_magic_line()?;
        if !magic.starts_with("Gamebryo File Format") {
            return Err(NifError::BadMagic);
        }

        let version = r.read_u32()?;
        if version != SUPPORTED_VERSION {
            return Err(NifError::UnsupportedVersion(version));
        }

        let endian = r.read_u8()?;
        if endian != 1 {
            return Err(NifError::UnsupportedEndian);
        }

        let user_version = r.read_u32()?;

        let num_blocks = r.read_u32()?;
        if num_blocks > MAX_BLOCKS {
            return Err(NifError::CorruptHeader(format!(
                "implausible block count {num_blocks}"
            )));
        }

        // Bethesda stream header: version plus three export-info strings.
        if user_version < 12 {
            return Err(NifError::UnsupportedBsVersion(0));
        }
        let bs_version = r.read_u32()?;
        if !SUPPORTED_BS_VERSIONS.contains(&bs_version) {
            return Err(NifError::UnsupportedBsVersion(bs_version));
        }
        r.read_short_string()?; // author
        r.read_short_string()?; // process script
        r.read_short_string()?; // export script

        let num_block_types = r.read_u16()?;
        if num_block_types > MAX_BLOCK_TYPES {
            return Err(NifError::CorruptHeader(format!(
                "implausible block type count {num_block_types}"
            )));
        }
        let mut block_types = Vec::with_capacity(num_block_types as usize);
        for _ in 0..num_block_types {
            block_types.push(r.read_sized_string()?);
        }

        let mut block_type_index = Vec::with_capacity(num_blocks as usize);
        for _ in 0..num_blocks {
            // High bit is a physics flag, not part of the index.
            block_type_index.push(r.read_u16()? & 0x7FFF);
        }
        for (i, &type_index) in block_type_index.iter().enumerate() {
            if type_index as usize >= block_types.len() {
                return Err(NifError::CorruptHeader(format!(
                    "block {i} references type {type_index} of {}",
                    block_types.len()
                )));
            }
        }

        let mut block_sizes = Vec::with_capacity(num_blocks as usize);
        for _ in 0..num_blocks {
            block_sizes.push(r.read_u32()?);
        }

        let num_strings = r.read_u32()?;
        if num_strings > MAX_STRINGS {
            return Err(NifError::CorruptHeader(format!(
                "implausible string count {num_strings}"
            )));
        }
        let _max_string_length = r.read_u32()?;
        let mut strings = Vec::with_capacity(num_strings as usize);
        for _ in 0..num_strings {
            strings.push(r.read_sized_string()?);
        }

        let num_groups = r.read_u32()?;
        for _ in 0..num_groups {
            r.read_u32()?;
        }

        Ok(Self {
            version,
            user_version,
            bs_version,
            num_blocks: num_blocks as usize,
            block_types,
            block_type_index,
            block_sizes,
            strings,
            data_offset: r.consumed,
        })
    }

    /// Type name of block `index`.
    pub fn block_type_name(&self, index: usize) -> &str {
        &self.block_types[self.block_type_index[index] as usize]
    }

    /// Byte offset of block `index` within the file.
    pub fn block_offset(&self, index: usize) -> u64 {
        let preceding: u64 = self.block_sizes[..index].iter().map(|&s| s as u64).sum();
        self.data_offset + preceding
    }

    /// True if the scene root (block 0) is a plain NiNode.
    ///
    /// Files whose root is anything else (shader packages, animation files)
    /// never carry the body-part node names the filter looks for.
    pub fn root_is_node(&self) -> bool {
        self.num_blocks > 0 && self.block_type_name(0) == "NiNode"
    }

    /// First keyword that exactly matches one of the header strings.
    pub fn matched_keyword<'a>(&self, keywords: &'a [String]) -> Option<&'a str> {
        keywords
            .iter()
            .find(|k| self.strings.iter().any(|s| s == *k))
            .map(String::as_str)
    }

    /// True if any named block in the file carries `name`.
    ///
    /// The string table alone can contain leftovers from deleted blocks, so
    /// this walks the type index and checks each named block's first field.
    pub fn has_named_block(&self, data: &[u8], name: &str) -> Result<bool, NifError> {
        let Some(string_index) = self.strings.iter().position(|s| s == name) else {
            return Ok(false);
        };
        for block in 0..self.num_blocks {
            if !NAMED_BLOCK_TYPES.contains(&self.block_type_name(block)) {
                continue;
            }
            if read_block_u32(data, self.block_offset(block), self.block_sizes[block], 0)
                .ok_or(NifError::Truncated { block })?
                == string_index as u32
            {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Outcome of patching a single file.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOutcome {
    /// Keyword whose node was found, or None if the file does not match.
    pub matched_keyword: Option<String>,

    /// Number of shader blocks rewritten.
    pub blocks_patched: usize,
}

/// Check whether a mesh file passes the keyword filter.
///
/// Reads only the header: the file is accepted when its scene root is a
/// NiNode and one of its header strings is exactly one of the keywords.
pub fn inspect(path: &Utf8Path, keywords: &[String]) -> Result<bool, NifError> {
    let file = fs::File::open(path.as_std_path())?;
    let mut reader = std::io::BufReader::new(file);
    let header = NifHeader::parse(&mut reader)?;
    Ok(header.root_is_node() && header.matched_keyword(keywords).is_some())
}

/// Rewrite glossiness and specular strength in every shader block of a file.
///
/// The whole file is read into memory, verified to carry a node named after
/// one of the keywords, and every BSLightingShaderProperty block gets its two
/// material floats overwritten. The result is written to a temporary file in
/// the same directory and then copied over the original, so a crash mid-write
/// never leaves a half-written mesh behind. A file with no shader blocks is
/// left untouched on disk.
pub fn patch_file(
    path: &Utf8Path,
    keywords: &[String],
    glossiness: f32,
    specular_strength: f32,
) -> Result<PatchOutcome, NifError> {
    let mut data = fs::read(path.as_std_path())?;
    let header = NifHeader::parse(&mut std::io::Cursor::new(&data[..]))?;

    if !header.root_is_node() {
        return Ok(PatchOutcome {
            matched_keyword: None,
            blocks_patched: 0,
        });
    }
    let Some(keyword) = header.matched_keyword(keywords) else {
        return Ok(PatchOutcome {
            matched_keyword: None,
            blocks_patched: 0,
        });
    };
    if !header.has_named_block(&data, keyword)? {
        return Ok(PatchOutcome {
            matched_keyword: None,
            blocks_patched: 0,
        });
    }
    let keyword = keyword.to_string();

    let mut blocks_patched = 0;
    for block in 0..header.num_blocks {
        if header.block_type_name(block) != SHADER_BLOCK_TYPE {
            continue;
        }
        let offset = header.block_offset(block);
        let size = header.block_sizes[block];

        // Field offsets inside the block shift by the extra-data list, whose
        // length sits at a fixed position near the start.
        let num_extra = read_block_u32(&data, offset, size, 8)
            .ok_or(NifError::Truncated { block })?;
        if num_extra > 4096 {
            return Err(NifError::CorruptHeader(format!(
                "shader block {block} declares {num_extra} extra data entries"
            )));
        }
        let shift = 4 * num_extra as u64;
        let glossiness_at = 72 + shift;
        let specular_at = 88 + shift;
        if specular_at + 4 > size as u64 {
            return Err(NifError::Truncated { block });
        }

        let old_glossiness = read_block_f32(&data, offset, size, glossiness_at)
            .ok_or(NifError::Truncated { block })?;
        let old_specular = read_block_f32(&data, offset, size, specular_at)
            .ok_or(NifError::Truncated { block })?;

        write_f32_at(&mut data, offset + glossiness_at, glossiness);
        write_f32_at(&mut data, offset + specular_at, specular_strength);
        blocks_patched += 1;

        tracing::info!(
            "{}: block {}: glossiness {} -> {}, specular strength {} -> {}",
            path,
            block,
            old_glossiness,
            glossiness,
            old_specular,
            specular_strength
        );
    }

    if blocks_patched == 0 {
        tracing::warn!("{}: keyword {:?} matched, but no shader block to patch", path, keyword);
        return Ok(PatchOutcome {
            matched_keyword: Some(keyword),
            blocks_patched: 0,
        });
    }

    write_replacing(path, &data)?;

    tracing::info!(
        "Patched {}: keyword {:?}, {} shader block(s)",
        path,
        keyword,
        blocks_patched
    );

    Ok(PatchOutcome {
        matched_keyword: Some(keyword),
        blocks_patched,
    })
}

/// Write the full contents to a temp file next to the original, then copy
/// over it. Copying instead of renaming preserves the original file's
/// permissions and works when something holds the file open on Windows.
fn write_replacing(path: &Utf8Path, data: &[u8]) -> Result<(), NifError> {
    let parent = path.parent().unwrap_or(Utf8Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(parent.as_std_path())?;
    temp.write_all(data)?;
    temp.flush()?;
    fs::copy(temp.path(), path.as_std_path())?;
    Ok(())
}

/// Read a little-endian u32 at `field` bytes into the block, bounds-checked
/// against both the block size and the file length.
fn read_block_u32(data: &[u8], block_offset: u64, block_size: u32, field: u64) -> Option<u32> {
    if field + 4 > block_size as u64 {
        return None;
    }
    let start = usize::try_from(block_offset + field).ok()?;
    let bytes = data.get(start..start + 4)?;
    Some(u32::from_le_bytes(bytes.try_into().unwrap()))
}

fn read_block_f32(data: &[u8], block_offset: u64, block_size: u32, field: u64) -> Option<f32> {
    read_block_u32(data, block_offset, block_size, field).map(f32::from_bits)
}

fn write_f32_at(data: &mut [u8], offset: u64, value: f32) {
    let start = offset as usize;
    data[start..start + 4].copy_from_slice(&value.to_le_bytes());
}

/// Reader wrapper that tracks how many bytes the header occupies.
struct HeaderReader<'a, R> {
    inner: &'a mut R,
    consumed: u64,
}

impl<'a, R: Read> HeaderReader<'a, R> {
    fn new(inner: &'a mut R) -> Self {
        Self { inner, consumed: 0 }
    }

    fn read_u8(&mut self) -> Result<u8, NifError> {
        let value = self.inner.read_u8()?;
        self.consumed += 1;
        Ok(value)
    }

    fn read_u16(&mut self) -> Result<u16, NifError> {
        let value = self.inner.read_u16::<LittleEndian>()?;
        self.consumed += 2;
        Ok(value)
    }

    fn read_u32(&mut self) -> Result<u32, NifError> {
        let value = self.inner.read_u32::<LittleEndian>()?;
        self.consumed += 4;
        Ok(value)
    }

    /// Newline-terminated version line at the very start of the file.
    fn read_magic_line(&mut self) -> Result<String, NifError> {
        let mut bytes = Vec::new();
        loop {
            let b = self.read_u8()?;
            if b == b'\n' {
                break;
            }
            bytes.push(b);
            if bytes.len() > 256 {
                return Err(NifError::BadMagic);
            }
        }
        String::from_utf8(bytes).map_err(|_| NifError::BadMagic)
    }

    /// u8 length prefix, used by the export-info strings.
    fn read_short_string(&mut self) -> Result<String, NifError> {
        let len = self.read_u8()? as usize;
        self.read_string_bytes(len)
    }

    /// u32 length prefix, used by the type and string tables.
    fn read_sized_string(&mut self) -> Result<String, NifError> {
        let len = self.read_u32()?;
        if len > MAX_STRING_LEN {
            return Err(NifError::CorruptHeader(format!(
                "implausible string length {len}"
            )));
        }
        self.read_string_bytes(len as usize)
    }

    fn read_string_bytes(&mut self, len: usize) -> Result<String, NifError> {
        let mut bytes = vec![0u8; len];
        self.inner.read_exact(&mut bytes)?;
        self.consumed += len as u64;
        // Export tools occasionally write trailing NULs into names.
        while bytes.last() == Some(&0) {
            bytes.pop();
        }
        String::from_utf8(bytes)
            .map_err(|e| NifError::CorruptHeader(format!("non-UTF-8 string: {e}")))
    }
}

#[cfg(test)]
pub mod testutil {
    //! Builder for synthetic mesh files used by the unit and integration
    //! tests. Produces byte-exact version 20.2.0.7 files with a block size
    //! table, so offset math gets exercised against realistic layouts.

    use super::*;
    use byteorder::WriteBytesExt;

    pub struct NifBuilder {
        bs_version: u32,
        strings: Vec<String>,
        /// (type name, raw block bytes)
        blocks: Vec<(String, Vec<u8>)>,
    }

    impl NifBuilder {
        pub fn new() -> Self {
            Self {
                bs_version: 100,
                strings: Vec::new(),
                blocks: Vec::new(),
            }
        }

        pub fn bs_version(mut self, version: u32) -> Self {
            self.bs_version = version;
            self
        }

        /// Intern a string, returning its table index.
        pub fn string(&mut self, value: &str) -> u32 {
            if let Some(i) = self.strings.iter().position(|s| s == value) {
                return i as u32;
            }
            self.strings.push(value.to_string());
            (self.strings.len() - 1) as u32
        }

        /// Add a named node block. Payload after the name index is filler.
        pub fn node(&mut self, type_name: &str, name: &str) -> &mut Self {
            let name_index = self.string(name);
            let mut data = Vec::new();
            data.write_u32::<LittleEndian>(name_index).unwrap();
            data.extend_from_slice(&[0u8; 36]);
            self.blocks.push((type_name.to_string(), data));
            self
        }

        /// Add a shader block with the given extra-data count and floats.
        pub fn shader(&mut self, num_extra: u32, glossiness: f32, specular: f32) -> &mut Self {
            let name_index = self.string("");
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
            self.blocks.push(("BSLightingShaderProperty".to_string(), data));
            self
        }

        pub fn build(&self) -> Vec<u8> {
            let mut out = Vec::new();
            out.extend_from_slice(b"Gamebryo File Format, Version 20.2.0.7\n");
            out.write_u32::<LittleEndian>(SUPPORTED_VERSION).unwrap();
            out.push(1); // little endian
            out.write_u32::<LittleEndian>(12).unwrap(); // user version
            out.write_u32::<LittleEndian>(self.blocks.len() as u32).unwrap();
            out.write_u32::<LittleEndian>(self.bs_version).unwrap();
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
    }

    /// A body mesh that passes the filter for keyword "UUNP".
    pub fn body_mesh() -> Vec<u8> {
        let mut b = NifBuilder::new();
        b.node("NiNode", "UUNP");
        b.node("BSTriShape", "BaseShape");
        b.shader(0, 80.0, 1.0);
        b.build()
    }

    /// A furniture mesh with no matching names.
    pub fn furniture_mesh() -> Vec<u8> {
        let mut b = NifBuilder::new();
        b.node("NiNode", "Chair01");
        b.shader(0, 80.0, 1.0);
        b.build()
    }

    pub fn keywords() -> Vec<String> {
        vec!["UUNP".to_string(), "FemaleHead".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;
    use std::io::Cursor;

    fn write_temp(data: &[u8]) -> (tempfile::TempDir, camino::Utf8PathBuf) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = camino::Utf8PathBuf::try_from(dir.path().join("mesh.nif")).unwrap();
        fs::write(&path, data).unwrap();
        (dir, path)
    }

    #[test]
    fn test_parse_header() {
        let data = body_mesh();
        let header = NifHeader::parse(&mut Cursor::new(&data[..])).unwrap();

        assert_eq!(header.version, SUPPORTED_VERSION);
        assert_eq!(header.bs_version, 100);
        assert_eq!(header.num_blocks, 3);
        assert_eq!(header.block_type_name(0), "NiNode");
        assert_eq!(header.block_type_name(1), "BSTriShape");
        assert_eq!(header.block_type_name(2), "BSLightingShaderProperty");
        assert!(header.root_is_node());
        assert!(header.strings.iter().any(|s| s == "UUNP"));
    }

    #[test]
    fn test_block_offsets_follow_size_table() {
        let data = body_mesh();
        let header = NifHeader::parse(&mut Cursor::new(&data[..])).unwrap();

        assert_eq!(header.block_offset(0), header.data_offset);
        assert_eq!(
            header.block_offset(1),
            header.data_offset + header.block_sizes[0] as u64
        );
        let last = header.num_blocks - 1;
        assert_eq!(
            header.block_offset(last) + header.block_sizes[last] as u64,
            data.len() as u64
        );
    }

    #[test]
    fn test_bad_magic_rejected() {
        let err = NifHeader::parse(&mut Cursor::new(&b"PNG\x0a\x00\x00\x00\x00"[..]));
        assert!(matches!(err, Err(NifError::BadMagic)));
    }

    #[test]
    fn test_unsupported_bs_version_rejected() {
        let mut b = NifBuilder::new().bs_version(130);
        b.node("NiNode", "UUNP");
        let data = b.build();

        let err = NifHeader::parse(&mut Cursor::new(&data[..]));
        assert!(matches!(err, Err(NifError::UnsupportedBsVersion(130))));
    }

    #[test]
    fn test_truncated_header_is_io_error() {
        let data = body_mesh();
        let err = NifHeader::parse(&mut Cursor::new(&data[..40]));
        assert!(matches!(err, Err(NifError::Io(_))));
    }

    #[test]
    fn test_inspect_accepts_matching_file() {
        let (_dir, path) = write_temp(&body_mesh());
        assert!(inspect(&path, &keywords()).unwrap());
    }

    #[test]
    fn test_inspect_rejects_non_matching_file() {
        let (_dir, path) = write_temp(&furniture_mesh());
        assert!(!inspect(&path, &keywords()).unwrap());
    }

    #[test]
    fn test_inspect_rejects_non_node_root() {
        let mut b = NifBuilder::new();
        b.node("BSTriShape", "UUNP");
        let (_dir, path) = write_temp(&b.build());

        assert!(!inspect(&path, &keywords()).unwrap());
    }

    #[test]
    fn test_patch_rewrites_shader_floats() {
        let (_dir, path) = write_temp(&body_mesh());

        let outcome = patch_file(&path, &keywords(), 450.0, 3.5).unwrap();
        assert_eq!(outcome.matched_keyword.as_deref(), Some("UUNP"));
        assert_eq!(outcome.blocks_patched, 1);

        let patched = fs::read(&path).unwrap();
        let header = NifHeader::parse(&mut Cursor::new(&patched[..])).unwrap();
        let offset = header.block_offset(2);
        let size = header.block_sizes[2];
        assert_eq!(read_block_f32(&patched, offset, size, 72), Some(450.0));
        assert_eq!(read_block_f32(&patched, offset, size, 88), Some(3.5));
        // Everything outside the two floats is untouched.
        let original = body_mesh();
        assert_eq!(patched.len(), original.len());
        assert_eq!(patched[..header.data_offset as usize], original[..header.data_offset as usize]);
    }

    #[test]
    fn test_patch_honors_extra_data_shift() {
        let mut b = NifBuilder::new();
        b.node("NiNode", "FemaleHead");
        b.shader(3, 80.0, 1.0);
        let (_dir, path) = write_temp(&b.build());

        let outcome = patch_file(&path, &keywords(), 200.0, 2.0).unwrap();
        assert_eq!(outcome.blocks_patched, 1);

        let patched = fs::read(&path).unwrap();
        let header = NifHeader::parse(&mut Cursor::new(&patched[..])).unwrap();
        let offset = header.block_offset(1);
        let size = header.block_sizes[1];
        assert_eq!(read_block_f32(&patched, offset, size, 72 + 12), Some(200.0));
        assert_eq!(read_block_f32(&patched, offset, size, 88 + 12), Some(2.0));
    }

    #[test]
    fn test_patch_multiple_shader_blocks() {
        let mut b = NifBuilder::new();
        b.node("NiNode", "UUNP");
        b.shader(0, 80.0, 1.0);
        b.shader(1, 90.0, 1.5);
        let (_dir, path) = write_temp(&b.build());

        let outcome = patch_file(&path, &keywords(), 450.0, 3.5).unwrap();
        assert_eq!(outcome.blocks_patched, 2);
    }

    #[test]
    fn test_patch_skips_non_matching_file() {
        let original = furniture_mesh();
        let (_dir, path) = write_temp(&original);

        let outcome = patch_file(&path, &keywords(), 450.0, 3.5).unwrap();
        assert_eq!(outcome.matched_keyword, None);
        assert_eq!(outcome.blocks_patched, 0);
        // File left untouched.
        assert_eq!(fs::read(&path).unwrap(), original);
    }

    #[test]
    fn test_patch_requires_keyword_on_a_named_block() {
        // Keyword present in the string table but not attached to any block.
        let mut b = NifBuilder::new();
        b.string("UUNP");
        b.node("NiNode", "Scene Root");
        b.shader(0, 80.0, 1.0);
        let (_dir, path) = write_temp(&b.build());

        let outcome = patch_file(&path, &keywords(), 450.0, 3.5).unwrap();
        assert_eq!(outcome.matched_keyword, None);
    }

    #[test]
    fn test_patch_matching_file_without_shaders() {
        let mut b = NifBuilder::new();
        b.node("NiNode", "UUNP");
        b.node("BSTriShape", "BaseShape");
        let original = b.build();
        let (_dir, path) = write_temp(&original);

        let outcome = patch_file(&path, &keywords(), 450.0, 3.5).unwrap();
        assert_eq!(outcome.matched_keyword.as_deref(), Some("UUNP"));
        assert_eq!(outcome.blocks_patched, 0);
        // Nothing was changed, so the file on disk must not be rewritten.
        assert_eq!(fs::read(&path).unwrap(), original);
    }

    #[test]
    fn test_patch_truncated_file_fails() {
        let data = body_mesh();
        let (_dir, path) = write_temp(&data[..data.len() - 20]);

        let err = patch_file(&path, &keywords(), 450.0, 3.5);
        assert!(matches!(err, Err(NifError::Truncated { .. })));
    }
}
