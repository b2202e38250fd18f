//! Binary patch buffer files.
//!
//! Layout, all little-endian:
//!
//! | Offset | Size | Content |
//! |--------|------|---------|
//! | 0 | 4 | magic `GRPT` |
//! | 4 | 4 | version (`1`) |
//! | 8 | 4 | patch count `n` |
//! | 12 | `n * 1284` | [`GpuPatch`] records |
//! | ... | `n * 128` | 32 `u32` vertex indices per patch |

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bytemuck::Zeroable;

use crate::error::{MeshError, Result};
use crate::patch::{GpuPatch, PackedPatches, MAX_PATCH_VERTICES};

/// File magic.
pub const MAGIC: [u8; 4] = *b"GRPT";

/// Current format version.
pub const VERSION: u32 = 1;

/// Write `packed` to `path`.
///
/// # Example
///
/// ```no_run
/// use gregory::io::patches;
/// use gregory::patch::PackedPatches;
///
/// patches::save(&PackedPatches::default(), "mesh.grpt").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(packed: &PackedPatches, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_to(packed, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Read a patch buffer written by [`save`].
pub fn load<P: AsRef<Path>>(path: P) -> Result<PackedPatches> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    read_from(&mut reader).map_err(|e| match e {
        MeshError::LoadError { message, .. } => MeshError::LoadError {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

fn write_to<W: Write>(packed: &PackedPatches, writer: &mut W) -> Result<()> {
    writer.write_all(&MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;
    writer.write_all(&(packed.patch_count() as u32).to_le_bytes())?;

    for patch in &packed.patches {
        for point in &patch.control_points {
            for w in &point.weights {
                writer.write_all(&w.to_le_bytes())?;
            }
        }
        writer.write_all(&patch.pn.to_le_bytes())?;
    }
    for index in &packed.indices {
        writer.write_all(&index.to_le_bytes())?;
    }
    Ok(())
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_from<R: Read>(reader: &mut R) -> Result<PackedPatches> {
    let format_error = |message: String| MeshError::LoadError {
        path: Default::default(),
        message,
    };

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(format_error("not a patch buffer".to_string()));
    }
    let version = read_u32(reader)?;
    if version != VERSION {
        return Err(format_error(format!("unsupported version {}", version)));
    }
    let count = read_u32(reader)? as usize;

    let mut packed = PackedPatches::default();
    for _ in 0..count {
        let mut patch = GpuPatch::zeroed();
        for point in &mut patch.control_points {
            for w in &mut point.weights {
                let mut bytes = [0u8; 2];
                reader.read_exact(&mut bytes)?;
                *w = u16::from_le_bytes(bytes);
            }
        }
        patch.pn = read_u32(reader)?;
        packed.patches.push(patch);
    }
    for _ in 0..count * MAX_PATCH_VERTICES {
        packed.indices.push(read_u32(reader)?);
    }
    Ok(packed)
}
