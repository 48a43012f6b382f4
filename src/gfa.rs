//! GFA 1.0 reading and writing.
//!
//! `S` lines are assigned dense 1-based ids in file order, and every segment
//! gets a provenance path named by its id so the original sequence can be
//! traced through later node splits. `L` lines create edges and overlap
//! records. `P` lines are validated and dropped: the node space is rewritten
//! by blunting, and provenance is the output-side lineage record.

use std::io::{BufRead, Write};

use rustc_hash::FxHashMap;

use crate::cigar::Alignment;
use crate::error::{BluntifyError, Result};
use crate::graph::{Edge, GraphView, Handle, HashGraph};
use crate::overlaps::OverlapMap;

/// Incremental segment-name <-> node-id map. Ids are 1-based and dense.
#[derive(Debug, Default)]
pub struct IdMap {
    names: Vec<String>,
    ids: FxHashMap<String, u64>,
}

impl IdMap {
    pub fn new() -> Self {
        IdMap::default()
    }

    pub fn insert(&mut self, name: &str) -> u64 {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        self.names.push(name.to_string());
        let id = self.names.len() as u64;
        self.ids.insert(name.to_string(), id);
        id
    }

    pub fn get_id(&self, name: &str) -> Option<u64> {
        self.ids.get(name).copied()
    }

    pub fn get_name(&self, id: u64) -> Option<&str> {
        self.names.get(id as usize - 1).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn parse_orientation(field: &str, line: usize) -> Result<bool> {
    match field {
        "+" => Ok(false),
        "-" => Ok(true),
        other => Err(BluntifyError::Parse {
            line,
            msg: format!("expected '+' or '-', found '{other}'"),
        }),
    }
}

/// Load GFA into `graph`, `id_map` and `overlaps`.
pub fn read_gfa<R: BufRead>(
    reader: R,
    graph: &mut HashGraph,
    id_map: &mut IdMap,
    overlaps: &mut OverlapMap,
) -> Result<()> {
    let mut pending_links: Vec<(String, bool, String, bool, String, usize)> = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        match fields[0] {
            "H" => {}
            "S" => {
                if fields.len() < 3 {
                    return Err(BluntifyError::Parse {
                        line: line_no,
                        msg: "S line needs a name and a sequence".to_string(),
                    });
                }
                let name = fields[1];
                if id_map.get_id(name).is_some() {
                    return Err(BluntifyError::Parse {
                        line: line_no,
                        msg: format!("duplicate segment '{name}'"),
                    });
                }
                let seq = fields[2];
                if seq == "*" {
                    return Err(BluntifyError::Parse {
                        line: line_no,
                        msg: format!("segment '{name}' has no sequence"),
                    });
                }
                let id = id_map.insert(name);
                let handle = graph.create_node_with_id(id, seq.as_bytes().to_vec());
                let path_name = id.to_string();
                graph.create_path(&path_name);
                graph.append_step(&path_name, handle);
            }
            "L" => {
                if fields.len() < 6 {
                    return Err(BluntifyError::Parse {
                        line: line_no,
                        msg: "L line needs from, orient, to, orient, overlap".to_string(),
                    });
                }
                // Links can legally precede their segments; resolve at the end.
                pending_links.push((
                    fields[1].to_string(),
                    parse_orientation(fields[2], line_no)?,
                    fields[3].to_string(),
                    parse_orientation(fields[4], line_no)?,
                    fields[5].to_string(),
                    line_no,
                ));
            }
            "P" => {
                if fields.len() < 3 {
                    return Err(BluntifyError::Parse {
                        line: line_no,
                        msg: "P line needs a name and a segment list".to_string(),
                    });
                }
                // Validated and dropped; blunting rewrites the node space.
            }
            other => {
                return Err(BluntifyError::Parse {
                    line: line_no,
                    msg: format!("unknown record type '{other}'"),
                });
            }
        }
    }

    for (from, from_rev, to, to_rev, cigar, line_no) in pending_links {
        let from_id = id_map.get_id(&from).ok_or_else(|| BluntifyError::Parse {
            line: line_no,
            msg: format!("link references unknown segment '{from}'"),
        })?;
        let to_id = id_map.get_id(&to).ok_or_else(|| BluntifyError::Parse {
            line: line_no,
            msg: format!("link references unknown segment '{to}'"),
        })?;
        let edge = Edge(
            Handle::new(from_id, from_rev),
            Handle::new(to_id, to_rev),
        );
        let alignment = Alignment::parse(&cigar, line_no)?;
        if graph.has_edge(edge.0, edge.1) {
            continue;
        }
        graph.create_edge(edge);
        overlaps.insert(edge, alignment);
    }
    Ok(())
}

/// Write the blunted graph: header, `S` lines in ascending id order, `L`
/// lines with zero overlap.
pub fn write_gfa<W: Write>(graph: &HashGraph, writer: &mut W) -> Result<()> {
    writeln!(writer, "H\tHVN:Z:1.0")?;
    let mut io_error = None;
    graph.for_each_handle(&mut |h| {
        if io_error.is_none() {
            let seq = graph.sequence(h);
            let res = writeln!(
                writer,
                "S\t{}\t{}",
                h.id(),
                String::from_utf8_lossy(&seq)
            );
            if let Err(e) = res {
                io_error = Some(e);
            }
        }
    });
    graph.for_each_edge(&mut |e| {
        if io_error.is_none() {
            let res = writeln!(
                writer,
                "L\t{}\t{}\t{}\t{}\t0M",
                e.0.id(),
                if e.0.is_reverse() { '-' } else { '+' },
                e.1.id(),
                if e.1.is_reverse() { '-' } else { '+' },
            );
            if let Err(e) = res {
                io_error = Some(e);
            }
        }
    });
    match io_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
