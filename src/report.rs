//! Plain-text and JSON rendering of query results and monitor frames.
//!
//! Text output is a borderless table: left-aligned columns padded with
//! spaces, one header row. JSON output carries the same data.
use std::io::{self, Write};
use std::sync::Arc;

use serde::Serialize;

use crate::cgroup::CgroupUsage;
use crate::fsutil::Probed;
use crate::monitor::Frame;
use crate::namespace::Namespace;
use crate::process::Process;
use crate::query::{CgroupSpec, MAX_COMMAND_LEN, NamespaceMembers, NamespaceSummary, truncate_command};

pub const NOT_FOUND: &str = "no data found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// The default report: one row per namespace.
pub fn summaries<W: Write>(out: &mut W, format: Format, rows: &[NamespaceSummary]) -> io::Result<()> {
    if format == Format::Json {
        return write_json(out, rows);
    }
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let users = row
                .uids
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            vec![
                row.namespace.id.to_string(),
                row.namespace.kind.to_string(),
                row.nprocs.to_string(),
                users,
                row.command.clone(),
            ]
        })
        .collect();
    write_table(out, &["NAMESPACE", "TYPE", "NPROCS", "USERS", "CMD"], &rows)
}

#[derive(Serialize)]
struct PidView<'a> {
    pid: u32,
    namespaces: &'a [Namespace],
}

/// Namespaces of a single pid.
pub fn pid_namespaces<W: Write>(
    out: &mut W,
    format: Format,
    pid: u32,
    namespaces: &[Namespace],
) -> io::Result<()> {
    if format == Format::Json {
        return write_json(out, &PidView { pid, namespaces });
    }
    let rows: Vec<Vec<String>> = namespaces
        .iter()
        .map(|ns| vec![ns.id.to_string(), ns.kind.to_string()])
        .collect();
    write_table(out, &["NAMESPACE", "TYPE"], &rows)
}

#[derive(Serialize)]
struct MembersView<'a> {
    #[serde(flatten)]
    namespace: Namespace,
    processes: &'a [Arc<Process>],
}

/// Member processes of every namespace matched by an id lookup.
pub fn namespace_members<W: Write>(
    out: &mut W,
    format: Format,
    groups: &[NamespaceMembers<'_>],
) -> io::Result<()> {
    if format == Format::Json {
        let views: Vec<MembersView<'_>> = groups
            .iter()
            .map(|group| MembersView {
                namespace: group.namespace,
                processes: group.processes,
            })
            .collect();
        return write_json(out, &views);
    }
    let rows: Vec<Vec<String>> = groups
        .iter()
        .flat_map(|group| {
            group.processes.iter().map(move |p| {
                vec![
                    group.namespace.kind.to_string(),
                    p.pid.to_string(),
                    p.ppid.to_string(),
                    p.name.clone(),
                    truncate_command(&p.command_line(), MAX_COMMAND_LEN),
                    p.threads.to_string(),
                    cgroups_cell(&p.cgroups),
                    p.state.clone(),
                ]
            })
        })
        .collect();
    write_table(
        out,
        &["TYPE", "PID", "PPID", "NAME", "CMD", "NTHREADS", "CGROUPS", "STATE"],
        &rows,
    )
}

fn cgroups_cell(cgroups: &Probed<String>) -> String {
    match cgroups {
        Probed::Present(raw) => raw.split_whitespace().collect::<Vec<_>>().join(" "),
        _ => "-".to_owned(),
    }
}

#[derive(Serialize)]
struct CgroupView<'a> {
    pid: u32,
    hierarchy: u32,
    files: &'a CgroupUsage,
}

/// Control files of one cgroup.
pub fn cgroup_usage<W: Write>(
    out: &mut W,
    format: Format,
    spec: CgroupSpec,
    usage: &CgroupUsage,
) -> io::Result<()> {
    if format == Format::Json {
        return write_json(
            out,
            &CgroupView {
                pid: spec.pid,
                hierarchy: spec.hierarchy.as_raw(),
                files: usage,
            },
        );
    }
    let rows: Vec<Vec<String>> = usage
        .iter()
        .map(|(name, _)| {
            vec![
                name.to_owned(),
                usage.single_line(name).unwrap_or_default(),
            ]
        })
        .collect();
    write_table(out, &["FILE", "VALUE"], &rows)
}

/// One monitor tick. JSON frames are written one per line.
pub fn frame<W: Write>(out: &mut W, format: Format, frame: &Frame) -> io::Result<()> {
    if format == Format::Json {
        serde_json::to_writer(&mut *out, frame)?;
        writeln!(out)?;
        return out.flush();
    }
    let process = &frame.process;
    writeln!(
        out,
        "[{}] PID {} PPID {} NAME {} STATE {} NTHREADS {}",
        frame.timestamp, process.pid, process.ppid, process.name, process.state, process.threads
    )?;
    let namespaces = frame
        .namespaces
        .iter()
        .map(Namespace::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    if !namespaces.is_empty() {
        writeln!(out, "NAMESPACES {namespaces}")?;
    }
    let rows: Vec<Vec<String>> = frame
        .values
        .iter()
        .map(|(column, value)| vec![column.clone(), value.clone()])
        .collect();
    write_table(out, &["CONTROL", "VALUE"], &rows)?;
    writeln!(out)?;
    out.flush()
}

/// Lookup miss, distinct from an empty but valid result.
pub fn not_found<W: Write>(out: &mut W, format: Format) -> io::Result<()> {
    match format {
        Format::Text => writeln!(out, "{NOT_FOUND}"),
        Format::Json => write_json(out, &serde_json::json!({ "error": NOT_FOUND })),
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

fn write_table<W: Write>(out: &mut W, header: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_row(out, &widths, header.iter().copied())?;
    for row in rows {
        write_row(out, &widths, row.iter().map(String::as_str))?;
    }
    Ok(())
}

fn write_row<'a, W: Write>(
    out: &mut W,
    widths: &[usize],
    cells: impl Iterator<Item = &'a str>,
) -> io::Result<()> {
    let line = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}
