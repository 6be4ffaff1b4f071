// src/report.rs

//! Plain-text rendering of units and clusters for the CLI.

use std::fmt::Write;

use chrono::Duration;

use crate::cluster::TaskUnitCluster;
use crate::config::Project;

/// One block per unit: dates, completion, direct and stale dependencies.
pub fn render_units(project: &Project) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "units ({}), now = {}:", project.units.len(), project.now);

    for (name, unit) in project.units.iter() {
        let _ = writeln!(out, "  - {name}");
        let _ = writeln!(
            out,
            "      anticipated: {} .. {}",
            unit.anticipated_start_date(),
            unit.anticipated_end_date()
        );
        let _ = writeln!(
            out,
            "      apparent:    {} .. {}",
            unit.apparent_start_date(),
            unit.apparent_end_date()
        );
        let _ = writeln!(
            out,
            "      state: {:?}{}",
            unit.lifecycle_state(),
            if unit.is_complete() { " (complete)" } else { "" }
        );
        if !unit.direct_dependencies().is_empty() {
            let names: Vec<&str> = unit.direct_dependencies().iter().map(|d| d.name()).collect();
            let _ = writeln!(out, "      after: {:?}", names);
        }
        if !unit.stale_direct_dependencies().is_empty() {
            let names: Vec<&str> = unit
                .stale_direct_dependencies()
                .iter()
                .map(|d| d.name())
                .collect();
            let _ = writeln!(out, "      stale: {:?}", names);
        }
        if !unit.projected_event_history().is_empty() {
            let kinds: Vec<String> = unit
                .projected_event_history()
                .iter()
                .map(|e| format!("{}@{}", e.kind(), e.date()))
                .collect();
            let _ = writeln!(out, "      projected: {}", kinds.join(", "));
        }
    }
    out
}

/// Paths in ranking order with their tracks of chains.
pub fn render_cluster(cluster: &TaskUnitCluster) -> String {
    let mut out = String::new();
    let heads: Vec<&str> = cluster.heads().iter().map(|h| h.name()).collect();
    let _ = writeln!(
        out,
        "cluster: {} units, {} chains, {} paths, heads {:?}",
        cluster.unit_count(),
        cluster.chain_map().len(),
        cluster.paths().len(),
        heads
    );

    for (rank, path) in cluster.paths_sorted_by_ranking().iter().enumerate() {
        let strain = cluster
            .strain_of_path(path)
            .map(|t| t.total_strain())
            .unwrap_or(0);
        let _ = writeln!(
            out,
            "  path #{rank} (strain {strain}, presence {})",
            format_duration(path.presence_time())
        );
        for (t, track) in path.tracks().iter().enumerate() {
            let chains: Vec<String> = track
                .iter()
                .map(|c| {
                    let names: Vec<&str> = c.units().iter().map(|u| u.name()).collect();
                    names.join(" -> ")
                })
                .collect();
            let _ = writeln!(out, "      track {t}: [{}]", chains.join("] ["));
        }
    }
    out
}

fn format_duration(d: Duration) -> String {
    let hours = d.num_hours();
    if hours.abs() >= 48 {
        format!("{}d {}h", hours / 24, hours % 24)
    } else {
        format!("{}h {}m", hours, d.num_minutes() % 60)
    }
}
