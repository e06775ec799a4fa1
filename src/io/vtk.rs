//! VTK output for oil concentration fields.
//!
//! Provides VTU (XML UnstructuredGrid) output for visualization in ParaView
//! and other VTK-compatible tools, plus a `.pvd` collection tying a series
//! of frames to their simulation times.
//!
//! Only triangle cells are written. Corner points shared by several cells are
//! written once.
//!
//! # Example
//!
//! ```ignore
//! use oilspill::io::write_vtk_oil;
//!
//! write_vtk_oil("oil.vtu", &mesh, time)?;
//! ```

use std::collections::HashMap;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::mesh::{Mesh2D, PointKey};

/// VTK cell type id of a linear triangle.
const VTK_TRIANGLE: u8 = 5;

/// Error type for VTK operations.
#[derive(Debug, Error)]
pub enum VtkError {
    /// I/O error during file operations.
    #[error("VTK I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Nothing to write.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),
}

/// Internal mesh representation for VTK output.
struct VtkMesh {
    /// Physical coordinates of all points.
    points: Vec<[f64; 3]>,
    /// Triangle connectivity into `points`.
    cells: Vec<[usize; 3]>,
    oil: Vec<f64>,
    fishing: Vec<u8>,
    cell_ids: Vec<usize>,
}

/// Collect the triangles of `mesh` with deduplicated corner points.
fn build_vtk_mesh(mesh: &Mesh2D) -> Result<VtkMesh, VtkError> {
    let n = mesh.n_triangles();
    if n == 0 {
        return Err(VtkError::InvalidMesh("mesh has no triangles".to_string()));
    }

    let mut index: HashMap<PointKey, usize> = HashMap::with_capacity(n);
    let mut vtk = VtkMesh {
        points: Vec::with_capacity(n),
        cells: Vec::with_capacity(n),
        oil: Vec::with_capacity(n),
        fishing: Vec::with_capacity(n),
        cell_ids: Vec::with_capacity(n),
    };

    for cell in mesh.triangles() {
        let mut tri = [0usize; 3];
        for (slot, p) in tri.iter_mut().zip(cell.corners()) {
            let next = vtk.points.len();
            *slot = *index.entry(PointKey::new(p)).or_insert_with(|| {
                vtk.points.push(*p);
                next
            });
        }
        vtk.cells.push(tri);
        vtk.oil.push(cell.oil());
        vtk.fishing.push(u8::from(cell.is_fishing()));
        vtk.cell_ids.push(cell.id().get());
    }
    Ok(vtk)
}

/// VTK XML writer helper.
struct VtkWriter<W: Write> {
    writer: BufWriter<W>,
    indent: usize,
}

impl<W: Write> VtkWriter<W> {
    fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            indent: 0,
        }
    }

    fn write_indent(&mut self) -> std::io::Result<()> {
        for _ in 0..self.indent {
            write!(self.writer, "  ")?;
        }
        Ok(())
    }

    fn write_header(&mut self, file_type: &str) -> std::io::Result<()> {
        writeln!(self.writer, "<?xml version=\"1.0\"?>")?;
        writeln!(
            self.writer,
            "<VTKFile type=\"{file_type}\" version=\"0.1\" byte_order=\"LittleEndian\">"
        )?;
        self.indent += 1;
        Ok(())
    }

    fn write_footer(&mut self) -> std::io::Result<()> {
        self.indent -= 1;
        writeln!(self.writer, "</VTKFile>")?;
        self.writer.flush()?;
        Ok(())
    }

    fn start_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> std::io::Result<()> {
        self.write_indent()?;
        write!(self.writer, "<{name}")?;
        for (key, value) in attrs {
            write!(self.writer, " {key}=\"{value}\"")?;
        }
        writeln!(self.writer, ">")?;
        self.indent += 1;
        Ok(())
    }

    fn empty_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> std::io::Result<()> {
        self.write_indent()?;
        write!(self.writer, "<{name}")?;
        for (key, value) in attrs {
            write!(self.writer, " {key}=\"{value}\"")?;
        }
        writeln!(self.writer, "/>")?;
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> std::io::Result<()> {
        self.indent -= 1;
        self.write_indent()?;
        writeln!(self.writer, "</{name}>")?;
        Ok(())
    }

    /// Write one ascii `DataArray`, `per_line` values per text line.
    fn write_data_array<T, F>(
        &mut self,
        attrs: &str,
        data: &[T],
        per_line: usize,
        fmt: F,
    ) -> std::io::Result<()>
    where
        F: Fn(&T) -> String,
    {
        self.write_indent()?;
        writeln!(self.writer, "<DataArray {attrs} format=\"ascii\">")?;

        self.indent += 1;
        for chunk in data.chunks(per_line.max(1)) {
            self.write_indent()?;
            let line: Vec<String> = chunk.iter().map(&fmt).collect();
            writeln!(self.writer, "{}", line.join(" "))?;
        }
        self.indent -= 1;

        self.write_indent()?;
        writeln!(self.writer, "</DataArray>")?;
        Ok(())
    }

    fn write_data_array_f64(&mut self, name: &str, data: &[f64]) -> std::io::Result<()> {
        let attrs = format!("type=\"Float64\" Name=\"{name}\"");
        self.write_data_array(&attrs, data, 6, |v| format!("{v:.10e}"))
    }

    fn write_data_array_int<T: Display>(
        &mut self,
        vtk_type: &str,
        name: &str,
        data: &[T],
    ) -> std::io::Result<()> {
        let attrs = format!("type=\"{vtk_type}\" Name=\"{name}\"");
        self.write_data_array(&attrs, data, 20, |v| v.to_string())
    }

    fn write_points(&mut self, points: &[[f64; 3]]) -> std::io::Result<()> {
        self.start_element("Points", &[])?;
        self.write_data_array(
            "type=\"Float64\" NumberOfComponents=\"3\"",
            points,
            2,
            |p| format!("{:.10e} {:.10e} {:.10e}", p[0], p[1], p[2]),
        )?;
        self.end_element("Points")
    }

    fn write_cells(&mut self, cells: &[[usize; 3]]) -> std::io::Result<()> {
        self.start_element("Cells", &[])?;

        let connectivity: Vec<usize> = cells.iter().flatten().copied().collect();
        self.write_data_array_int("Int64", "connectivity", &connectivity)?;

        let offsets: Vec<usize> = (1..=cells.len()).map(|i| i * 3).collect();
        self.write_data_array_int("Int64", "offsets", &offsets)?;

        let types = vec![VTK_TRIANGLE; cells.len()];
        self.write_data_array_int("UInt8", "types", &types)?;

        self.end_element("Cells")
    }

    fn write_field_data(&mut self, name: &str, value: f64) -> std::io::Result<()> {
        self.start_element("FieldData", &[])?;
        let attrs = format!("type=\"Float64\" Name=\"{name}\" NumberOfTuples=\"1\"");
        self.write_data_array(&attrs, &[value], 1, |v| format!("{v:.10e}"))?;
        self.end_element("FieldData")
    }
}

/// Write the oil field of `mesh` to a VTU file.
///
/// Cell data: `oil` (Float64), `fishing` (UInt8, 0/1), `cell_id` (UInt64).
/// The simulation time is stored as `TimeValue` field data.
pub fn write_vtk_oil(path: impl AsRef<Path>, mesh: &Mesh2D, time: f64) -> Result<(), VtkError> {
    let vtk_mesh = build_vtk_mesh(mesh)?;
    let file = File::create(path)?;
    let mut writer = VtkWriter::new(file);

    let n_points = vtk_mesh.points.len().to_string();
    let n_cells = vtk_mesh.cells.len().to_string();

    writer.write_header("UnstructuredGrid")?;
    writer.start_element("UnstructuredGrid", &[])?;
    writer.start_element(
        "Piece",
        &[("NumberOfPoints", &n_points), ("NumberOfCells", &n_cells)],
    )?;

    writer.write_points(&vtk_mesh.points)?;
    writer.write_cells(&vtk_mesh.cells)?;

    writer.start_element("CellData", &[("Scalars", "oil")])?;
    writer.write_data_array_f64("oil", &vtk_mesh.oil)?;
    writer.write_data_array_int("UInt8", "fishing", &vtk_mesh.fishing)?;
    writer.write_data_array_int("UInt64", "cell_id", &vtk_mesh.cell_ids)?;
    writer.end_element("CellData")?;

    writer.end_element("Piece")?;
    writer.write_field_data("TimeValue", time)?;
    writer.end_element("UnstructuredGrid")?;
    writer.write_footer()?;

    Ok(())
}

/// Write VTK file with automatic frame numbering.
///
/// Creates filename like `base_0001.vtu` for frame 1.
/// Returns the full path of the created file.
pub fn write_vtk_series(
    base_path: impl AsRef<Path>,
    frame: usize,
    mesh: &Mesh2D,
    time: f64,
) -> Result<PathBuf, VtkError> {
    let base = base_path.as_ref();
    let stem = base.file_stem().unwrap_or_default().to_string_lossy();
    let parent = base.parent().unwrap_or(Path::new("."));

    let filename = format!("{stem}_{frame:04}.vtu");
    let path = parent.join(filename);
    write_vtk_oil(&path, mesh, time)?;

    Ok(path)
}

/// Write a ParaView collection listing `(time, file)` frames.
///
/// Files are referenced by name relative to the collection's folder.
pub fn write_pvd(path: impl AsRef<Path>, frames: &[(f64, PathBuf)]) -> Result<(), VtkError> {
    let file = File::create(path.as_ref())?;
    let mut writer = VtkWriter::new(file);

    writer.write_header("Collection")?;
    writer.start_element("Collection", &[])?;
    for (time, frame) in frames {
        let name = frame
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let timestep = format!("{time:.10e}");
        writer.empty_element(
            "DataSet",
            &[
                ("timestep", &timestep),
                ("group", ""),
                ("part", "0"),
                ("file", &name),
            ],
        )?;
    }
    writer.end_element("Collection")?;
    writer.write_footer()?;

    Ok(())
}
