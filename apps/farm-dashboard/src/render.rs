//! # Text Rendering
//!
//! Plain-text rendition of the dashboard for the terminal.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Print Farm  ready  2 details  2 allocations                           │
//! │                                                                         │
//! │  ROOMS                                                                  │
//! │  четвірка     30/90   [######..............]  free 60                  │
//! │      Деталь 1              printers 30  started 10  remaining 20       │
//! │  курілка      40/40   [####################]  full                     │
//! │      Деталь 2              printers 40  started 0   remaining 40       │
//! │                                                                         │
//! │  DETAILS                                                                │
//! │  Деталь 1              plan 100  allocated 30  started 10              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use farm_core::capacity::{detail_progress, room_summaries, RoomSummary};
use farm_core::FarmSnapshot;

use crate::state::DashboardStatus;

const BAR_WIDTH: usize = 20;

/// Borrowed view of everything the dashboard prints.
#[derive(Debug)]
pub struct DashboardView<'a> {
    pub snapshot: &'a FarmSnapshot,
    pub status: &'a DashboardStatus,
}

impl<'a> DashboardView<'a> {
    pub fn new(snapshot: &'a FarmSnapshot, status: &'a DashboardStatus) -> Self {
        DashboardView { snapshot, status }
    }
}

fn bar(summary: &RoomSummary) -> String {
    let filled = (summary.utilisation().clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

impl fmt::Display for DashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.status.ready {
            "ready"
        } else if self.status.loading {
            "loading"
        } else {
            "unavailable"
        };
        writeln!(
            f,
            "Print Farm  {}  {} details  {} allocations",
            state, self.status.details, self.status.allocations
        )?;

        if let Some(err) = &self.status.last_error {
            writeln!(f, "! {}", err.message)?;
        }

        writeln!(f)?;
        writeln!(f, "ROOMS")?;
        for summary in room_summaries(self.snapshot) {
            let free = if summary.can_allocate() {
                format!("free {}", summary.available)
            } else {
                "full".to_string()
            };
            writeln!(
                f,
                "{:<12} {:>3}/{:<3}  {}  {}",
                summary.room.name.as_str(),
                summary.used,
                summary.room.capacity,
                bar(&summary),
                free
            )?;
            for line in &summary.lines {
                writeln!(
                    f,
                    "    {:<22} printers {:<3} started {:<3} remaining {}",
                    line.detail_name, line.printers, line.started, line.remaining
                )?;
            }
        }

        writeln!(f)?;
        writeln!(f, "DETAILS")?;
        for row in detail_progress(self.snapshot) {
            writeln!(
                f,
                "{:<22} plan {:<5} allocated {:<4} started {}",
                row.name, row.plan, row.allocated, row.started
            )?;
        }

        Ok(())
    }
}
