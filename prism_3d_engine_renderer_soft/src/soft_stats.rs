/// Rasterizer work counters with a colored console report.

use colored::*;

/// Work done by one device since creation or the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoftStats {
    pub draw_calls: u64,
    /// Vertex stream bytes handed to draw calls
    pub vertex_bytes: u64,
    pub triangles: u64,
    /// Triangles rejected before rasterization (zero area)
    pub degenerate_triangles: u64,
    pub fragments_shaded: u64,
    /// Fragments the program discarded
    pub fragments_discarded: u64,
    pub image_draws: u64,
}

impl SoftStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Print a short summary to stdout
    pub fn print_report(&self) {
        if self.draw_calls == 0 && self.image_draws == 0 {
            println!("\n{}", "No rasterizer work recorded".green().bold());
            return;
        }

        println!("\n{}", "=== Soft Rasterizer Report ===".bright_blue().bold());
        println!("  {} {}", "Draw calls:".white().bold(), self.draw_calls);
        println!("  {} {} KiB", "Vertex data:".white(), self.vertex_bytes / 1024);
        println!("  {} {}", "Triangles:".white(), self.triangles);
        if self.degenerate_triangles > 0 {
            println!("  {} {}", "Degenerate:".yellow(), self.degenerate_triangles);
        }
        println!("  {} {}", "Fragments:".cyan(), self.fragments_shaded);
        if self.fragments_discarded > 0 {
            println!("  {} {}", "Discarded:".bright_black(), self.fragments_discarded);
        }
        println!("  {} {}", "Image draws:".white(), self.image_draws);
        println!("{}\n", "==============================".bright_blue().bold());
    }
}
