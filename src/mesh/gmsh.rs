//! Gmsh mesh file I/O.
//!
//! Reads ASCII MSH files in format 2.2 and 4.1 and produces a [`RawMesh`]:
//! a point array plus typed connectivity blocks. Writing always emits 2.2.
//!
//! ## Kept element types
//! - 15 = Point (1-node) → `vertex`
//! - 1 = Line (2-node) → `line`
//! - 2 = Triangle (3-node) → `triangle`
//! - 3 = Quadrilateral (4-node) → `quad`
//!
//! Everything else (tetrahedra, second-order elements, ...) is skipped.
//!
//! ## Example
//! ```no_run
//! use oilspill::mesh::gmsh::read_gmsh_mesh;
//! use std::path::Path;
//!
//! let raw = read_gmsh_mesh(Path::new("bay.msh")).expect("Failed to read mesh");
//! println!("{} points, {} cells", raw.points.len(), raw.n_cells());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use super::cell::{CellKind, Point3};
use super::raw::{CellBlock, RawMesh};

/// Error type for Gmsh I/O operations.
#[derive(Debug, Error)]
pub enum GmshError {
    /// File could not be opened or written.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid file format.
    #[error("Parse error in ${section}: {message}")]
    ParseError { section: String, message: String },

    /// Unsupported mesh format version or file type.
    #[error("Unsupported Gmsh format: {0}")]
    UnsupportedVersion(String),

    /// Missing required section.
    #[error("Missing section: {0}")]
    MissingSection(String),

    /// Element references a node tag that was never declared.
    #[error("Element {element} references unknown node {node}")]
    UnknownNode { element: usize, node: usize },
}

/// Map a Gmsh element type number to the cell kind it becomes.
fn kind_for_element_type(element_type: i32) -> Option<CellKind> {
    match element_type {
        15 => Some(CellKind::Vertex),
        1 => Some(CellKind::Line),
        2 => Some(CellKind::Triangle),
        3 => Some(CellKind::Quad),
        _ => None,
    }
}

fn element_type_for_kind(kind: CellKind) -> i32 {
    match kind {
        CellKind::Vertex => 15,
        CellKind::Line => 1,
        CellKind::Triangle => 2,
        CellKind::Quad => 3,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MshVersion {
    V2,
    V4,
}

// ============================================================================
// Line cursor
// ============================================================================

/// Sequential reader over the non-empty lines of one `$Section`.
struct SectionCursor<'a> {
    name: &'a str,
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> SectionCursor<'a> {
    fn error(&self, message: impl Into<String>) -> GmshError {
        GmshError::ParseError {
            section: self.name.to_string(),
            message: message.into(),
        }
    }

    fn next_line(&mut self) -> Result<&'a str, GmshError> {
        let line = self
            .lines
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.error("unexpected end of section"))?;
        self.pos += 1;
        Ok(line)
    }

    /// Lines left in the section; an upper bound for any count read from it.
    fn remaining(&self) -> usize {
        self.lines.len().saturating_sub(self.pos)
    }

    fn next_fields(&mut self) -> Result<Vec<&'a str>, GmshError> {
        Ok(self.next_line()?.split_whitespace().collect())
    }

    fn parse<T: std::str::FromStr>(&self, field: Option<&&str>, what: &str) -> Result<T, GmshError> {
        let raw = field.ok_or_else(|| self.error(format!("missing {what}")))?;
        raw.parse()
            .map_err(|_| self.error(format!("invalid {what}: {raw}")))
    }
}

/// Split file contents into `$Name ... $EndName` sections.
fn split_sections(text: &str) -> Result<HashMap<&str, SectionCursor<'_>>, GmshError> {
    let mut sections = HashMap::new();
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    while let Some(line) = lines.next() {
        let Some(name) = line.strip_prefix('$') else {
            continue;
        };
        let end = format!("$End{name}");
        let mut body = Vec::new();
        let mut closed = false;
        for inner in lines.by_ref() {
            if inner == end {
                closed = true;
                break;
            }
            body.push(inner);
        }
        if !closed {
            return Err(GmshError::ParseError {
                section: name.to_string(),
                message: format!("missing {end}"),
            });
        }
        sections.entry(name).or_insert(SectionCursor {
            name,
            lines: body,
            pos: 0,
        });
    }
    Ok(sections)
}

// ============================================================================
// Reading
// ============================================================================

/// Read a Gmsh MSH file (format 2.2 or 4.1, ASCII).
///
/// # Arguments
/// * `path` - Path to the MSH file
///
/// # Returns
/// * `Ok(RawMesh)` - Points and typed cell blocks
/// * `Err(GmshError)` - If reading or parsing fails
pub fn read_gmsh_mesh(path: &Path) -> Result<RawMesh, GmshError> {
    let text = fs::read_to_string(path)?;
    let raw = parse_gmsh(&text)?;
    tracing::debug!(
        path = %path.display(),
        points = raw.points.len(),
        blocks = raw.blocks.len(),
        "read gmsh mesh"
    );
    Ok(raw)
}

/// Parse MSH file contents already held in memory.
pub fn parse_gmsh(text: &str) -> Result<RawMesh, GmshError> {
    let mut sections = split_sections(text)?;

    let mut format = sections
        .remove("MeshFormat")
        .ok_or_else(|| GmshError::MissingSection("MeshFormat".to_string()))?;
    let version = parse_mesh_format(&mut format)?;

    let mut nodes = sections
        .remove("Nodes")
        .ok_or_else(|| GmshError::MissingSection("Nodes".to_string()))?;
    let (points, node_index) = match version {
        MshVersion::V2 => parse_nodes_v2(&mut nodes)?,
        MshVersion::V4 => parse_nodes_v4(&mut nodes)?,
    };

    let mut elements = sections
        .remove("Elements")
        .ok_or_else(|| GmshError::MissingSection("Elements".to_string()))?;
    let mut skipped = BTreeMap::new();
    let blocks = match version {
        MshVersion::V2 => parse_elements_v2(&mut elements, &node_index, &mut skipped)?,
        MshVersion::V4 => parse_elements_v4(&mut elements, &node_index, &mut skipped)?,
    };

    for (element_type, count) in skipped {
        tracing::debug!(element_type, count, "skipped unsupported gmsh elements");
    }

    Ok(RawMesh::new(points, blocks))
}

/// Parse the $MeshFormat section.
fn parse_mesh_format(cursor: &mut SectionCursor<'_>) -> Result<MshVersion, GmshError> {
    let fields = cursor.next_fields()?;
    let version = fields
        .first()
        .copied()
        .ok_or_else(|| cursor.error("empty format line"))?;
    if fields.get(1).is_some_and(|file_type| *file_type != "0") {
        return Err(GmshError::UnsupportedVersion(format!("{version} (binary)")));
    }
    if version.starts_with("2.") {
        Ok(MshVersion::V2)
    } else if version.starts_with("4.") {
        Ok(MshVersion::V4)
    } else {
        Err(GmshError::UnsupportedVersion(version.to_string()))
    }
}

type NodeIndex = HashMap<usize, usize>;

fn parse_point(cursor: &SectionCursor<'_>, coords: &[&str]) -> Result<Point3, GmshError> {
    let x = cursor.parse(coords.first(), "x coordinate")?;
    let y = cursor.parse(coords.get(1), "y coordinate")?;
    let z = cursor.parse(coords.get(2), "z coordinate")?;
    Ok([x, y, z])
}

/// 2.2 layout: `n`, then `tag x y z` per node.
fn parse_nodes_v2(cursor: &mut SectionCursor<'_>) -> Result<(Vec<Point3>, NodeIndex), GmshError> {
    let header = cursor.next_fields()?;
    let n_nodes: usize = cursor.parse(header.first(), "node count")?;

    let capacity = n_nodes.min(cursor.remaining());
    let mut points = Vec::with_capacity(capacity);
    let mut index = HashMap::with_capacity(capacity);
    for _ in 0..n_nodes {
        let fields = cursor.next_fields()?;
        let tag: usize = cursor.parse(fields.first(), "node tag")?;
        let point = parse_point(cursor, fields.get(1..).unwrap_or_default())?;
        index.insert(tag, points.len());
        points.push(point);
    }
    Ok((points, index))
}

/// 4.1 layout: a header, then per entity block the node tags followed by
/// their coordinates.
fn parse_nodes_v4(cursor: &mut SectionCursor<'_>) -> Result<(Vec<Point3>, NodeIndex), GmshError> {
    let header = cursor.next_fields()?;
    let n_blocks: usize = cursor.parse(header.first(), "entity block count")?;
    let n_nodes: usize = cursor.parse(header.get(1), "node count")?;

    // Each node takes a tag line and a coordinate line.
    let capacity = n_nodes.min(cursor.remaining() / 2);
    let mut points = Vec::with_capacity(capacity);
    let mut index = HashMap::with_capacity(capacity);
    for _ in 0..n_blocks {
        let block = cursor.next_fields()?;
        let in_block: usize = cursor.parse(block.get(3), "nodes in block")?;

        let mut tags = Vec::with_capacity(in_block.min(cursor.remaining()));
        for _ in 0..in_block {
            let fields = cursor.next_fields()?;
            tags.push(cursor.parse::<usize>(fields.first(), "node tag")?);
        }
        for tag in tags {
            let fields = cursor.next_fields()?;
            let point = parse_point(cursor, &fields)?;
            index.insert(tag, points.len());
            points.push(point);
        }
    }
    Ok((points, index))
}

fn resolve_nodes(
    cursor: &SectionCursor<'_>,
    element: usize,
    fields: &[&str],
    n_corners: usize,
    node_index: &NodeIndex,
) -> Result<Vec<usize>, GmshError> {
    if fields.len() < n_corners {
        return Err(cursor.error(format!(
            "element {element} needs {n_corners} nodes, found {}",
            fields.len()
        )));
    }
    fields[..n_corners]
        .iter()
        .map(|f| {
            let node: usize = cursor.parse(Some(f), "node tag")?;
            node_index
                .get(&node)
                .copied()
                .ok_or(GmshError::UnknownNode { element, node })
        })
        .collect()
}

/// 2.2 layout: `n`, then `id type n_tags tags... nodes...` per element.
///
/// Consecutive elements of the same kind are grouped into one block.
fn parse_elements_v2(
    cursor: &mut SectionCursor<'_>,
    node_index: &NodeIndex,
    skipped: &mut BTreeMap<i32, usize>,
) -> Result<Vec<CellBlock>, GmshError> {
    let header = cursor.next_fields()?;
    let n_elements: usize = cursor.parse(header.first(), "element count")?;

    let mut blocks: Vec<CellBlock> = Vec::new();
    for _ in 0..n_elements {
        let fields = cursor.next_fields()?;
        let element: usize = cursor.parse(fields.first(), "element id")?;
        let element_type: i32 = cursor.parse(fields.get(1), "element type")?;
        let n_tags: usize = cursor.parse(fields.get(2), "tag count")?;

        let Some(kind) = kind_for_element_type(element_type) else {
            *skipped.entry(element_type).or_default() += 1;
            continue;
        };
        let node_fields = fields.get(3 + n_tags..).unwrap_or_default();
        let nodes = resolve_nodes(cursor, element, node_fields, kind.n_corners(), node_index)?;

        match blocks.last_mut() {
            Some(block) if block.kind == kind => block.connectivity.push(nodes),
            _ => blocks.push(CellBlock::new(kind, vec![nodes])),
        }
    }
    Ok(blocks)
}

/// 4.1 layout: a header, then per entity block `dim tag type n` followed by
/// `id nodes...` lines. Each entity block becomes one cell block.
fn parse_elements_v4(
    cursor: &mut SectionCursor<'_>,
    node_index: &NodeIndex,
    skipped: &mut BTreeMap<i32, usize>,
) -> Result<Vec<CellBlock>, GmshError> {
    let header = cursor.next_fields()?;
    let n_blocks: usize = cursor.parse(header.first(), "entity block count")?;

    let mut blocks = Vec::new();
    for _ in 0..n_blocks {
        let block = cursor.next_fields()?;
        let element_type: i32 = cursor.parse(block.get(2), "element type")?;
        let in_block: usize = cursor.parse(block.get(3), "elements in block")?;
        let kind = kind_for_element_type(element_type);

        let capacity = if kind.is_some() {
            in_block.min(cursor.remaining())
        } else {
            0
        };
        let mut connectivity = Vec::with_capacity(capacity);
        for _ in 0..in_block {
            let fields = cursor.next_fields()?;
            let Some(kind) = kind else {
                continue;
            };
            let element: usize = cursor.parse(fields.first(), "element id")?;
            let node_fields = fields.get(1..).unwrap_or_default();
            connectivity.push(resolve_nodes(
                cursor,
                element,
                node_fields,
                kind.n_corners(),
                node_index,
            )?);
        }

        match kind {
            Some(kind) => blocks.push(CellBlock::new(kind, connectivity)),
            None => *skipped.entry(element_type).or_default() += in_block,
        }
    }
    Ok(blocks)
}

// ============================================================================
// Writing
// ============================================================================

/// Write a [`RawMesh`] to Gmsh MSH format 2.2.
///
/// # Arguments
/// * `mesh` - The mesh to write
/// * `path` - Output file path
pub fn write_gmsh_mesh(mesh: &RawMesh, path: &Path) -> Result<(), GmshError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "$MeshFormat")?;
    writeln!(writer, "2.2 0 8")?;
    writeln!(writer, "$EndMeshFormat")?;

    writeln!(writer, "$Nodes")?;
    writeln!(writer, "{}", mesh.points.len())?;
    for (i, p) in mesh.points.iter().enumerate() {
        writeln!(writer, "{} {} {} {}", i + 1, p[0], p[1], p[2])?;
    }
    writeln!(writer, "$EndNodes")?;

    writeln!(writer, "$Elements")?;
    writeln!(writer, "{}", mesh.n_cells())?;
    let mut elem_id = 1;
    for block in &mesh.blocks {
        let element_type = element_type_for_kind(block.kind);
        for nodes in &block.connectivity {
            // elem_id type n_tags physical geometrical nodes...
            write!(writer, "{elem_id} {element_type} 2 0 0")?;
            for n in nodes {
                write!(writer, " {}", n + 1)?;
            }
            writeln!(writer)?;
            elem_id += 1;
        }
    }
    writeln!(writer, "$EndElements")?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as IoWrite;
    use tempfile::NamedTempFile;

    const TWO_TRIANGLES_V2: &str = r#"$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
4
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 0.5 1.0 0.0
4 1.0 1.0 0.0
$EndNodes
$Elements
4
1 15 2 0 1 1
2 1 2 1 1 1 2
3 2 2 0 0 1 2 3
4 2 2 0 0 2 4 3
$EndElements"#;

    #[test]
    fn test_read_v2_mesh() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{TWO_TRIANGLES_V2}").unwrap();

        let raw = read_gmsh_mesh(file.path()).unwrap();
        assert_eq!(raw.points.len(), 4);
        assert_eq!(raw.blocks.len(), 3);
        assert_eq!(raw.blocks[0].kind, CellKind::Vertex);
        assert_eq!(raw.blocks[1].kind, CellKind::Line);
        assert_eq!(raw.blocks[2].kind, CellKind::Triangle);
        // 1-based tags become 0-based indices
        assert_eq!(raw.blocks[2].connectivity, vec![vec![0, 1, 2], vec![1, 3, 2]]);
    }

    #[test]
    fn test_read_v4_mesh() {
        let text = r#"$MeshFormat
4.1 0 8
$EndMeshFormat
$Entities
0 0 1 0
1 0 0 0 1 1 0 0 0
$EndEntities
$Nodes
1 4 10 13
2 1 0 4
10
11
12
13
0 0 0
1 0 0
0.5 1 0
1 1 0
$EndNodes
$Elements
2 3 1 3
1 1 1 1
1 10 11
2 1 2 2
2 10 11 12
3 11 13 12
$EndElements
"#;
        let raw = parse_gmsh(text).unwrap();
        assert_eq!(raw.points.len(), 4);
        assert_eq!(raw.points[2], [0.5, 1.0, 0.0]);
        assert_eq!(raw.blocks.len(), 2);
        assert_eq!(raw.blocks[0].kind, CellKind::Line);
        assert_eq!(raw.blocks[0].connectivity, vec![vec![0, 1]]);
        assert_eq!(raw.blocks[1].connectivity, vec![vec![0, 1, 2], vec![1, 3, 2]]);
    }

    #[test]
    fn test_unsupported_elements_are_skipped() {
        let text = r#"$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
4
1 0 0 0
2 1 0 0
3 0 1 0
4 0 0 1
$EndNodes
$Elements
3
1 2 2 0 0 1 2 3
2 4 2 0 0 1 2 3 4
3 2 2 0 0 1 3 4
$EndElements
"#;
        let raw = parse_gmsh(text).unwrap();
        // the skipped tetrahedron does not split the triangle run
        assert_eq!(raw.blocks.len(), 1);
        assert_eq!(raw.blocks[0].len(), 2);
    }

    #[test]
    fn test_roundtrip() {
        let raw = RawMesh::uniform_rectangle(0.0, 1.0, 0.0, 0.5, 3, 2);

        let file = NamedTempFile::new().unwrap();
        write_gmsh_mesh(&raw, file.path()).unwrap();
        let back = read_gmsh_mesh(file.path()).unwrap();

        assert_eq!(back.points, raw.points);
        assert_eq!(back.blocks, raw.blocks);
    }

    #[test]
    fn test_error_missing_nodes() {
        let text = r#"$MeshFormat
2.2 0 8
$EndMeshFormat
$Elements
1
1 2 2 0 0 1 2 3
$EndElements"#;
        assert!(matches!(
            parse_gmsh(text),
            Err(GmshError::MissingSection(s)) if s == "Nodes"
        ));
    }

    #[test]
    fn test_error_unknown_node() {
        let text = r#"$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
2
1 0 0 0
2 1 0 0
$EndNodes
$Elements
1
7 1 0 1 9
$EndElements"#;
        assert!(matches!(
            parse_gmsh(text),
            Err(GmshError::UnknownNode { element: 7, node: 9 })
        ));
    }

    #[test]
    fn test_error_binary_and_unclosed() {
        let binary = "$MeshFormat\n4.1 1 8\n$EndMeshFormat\n";
        assert!(matches!(
            parse_gmsh(binary),
            Err(GmshError::UnsupportedVersion(_))
        ));

        let unclosed = "$MeshFormat\n2.2 0 8\n$EndMeshFormat\n$Nodes\n1\n1 0 0 0\n";
        assert!(matches!(parse_gmsh(unclosed), Err(GmshError::ParseError { .. })));
    }

    #[test]
    fn test_huge_counts_are_parse_errors() {
        let nodes_v2 = "$MeshFormat\n2.2 0 8\n$EndMeshFormat\n$Nodes\n1000000000000000000\n$EndNodes\n";
        assert!(matches!(parse_gmsh(nodes_v2), Err(GmshError::ParseError { .. })));

        let nodes_v4 = "$MeshFormat\n4.1 0 8\n$EndMeshFormat\n$Nodes\n1 1000000000000000000 1 1\n2 1 0 1000000000000000000\n$EndNodes\n";
        assert!(matches!(parse_gmsh(nodes_v4), Err(GmshError::ParseError { .. })));

        let elements_v4 = "$MeshFormat\n4.1 0 8\n$EndMeshFormat\n$Nodes\n1 1 1 1\n2 1 0 1\n1\n0 0 0\n$EndNodes\n$Elements\n1 1000000000000000000 1 1\n2 1 2 1000000000000000000\n$EndElements\n";
        assert!(matches!(parse_gmsh(elements_v4), Err(GmshError::ParseError { .. })));
    }
}
