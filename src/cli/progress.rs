use std::time::Instant;

pub struct ProgressIndicator {
    total: usize,
    completed: usize,
    failed: usize,
    enabled: bool,
    start_time: Instant,
}

impl ProgressIndicator {
    pub fn new(total: usize, enabled: bool) -> Self {
        Self {
            total,
            completed: 0,
            failed: 0,
            enabled,
            start_time: Instant::now(),
        }
    }

    pub fn start_step(&self, name: &str) {
        if self.enabled {
            println!(
                "Step: {} ({}/{})",
                name,
                self.completed + self.failed + 1,
                self.total
            );
        }
    }

    pub fn complete_step(&mut self, name: &str, success: bool) {
        if success {
            self.completed += 1;
        } else {
            self.failed += 1;
            if self.enabled {
                eprintln!("✗ {}", name);
            }
        }
    }

    /// Steps that turned out not to apply still count toward the total
    pub fn skip_step(&mut self, name: &str, reason: &str) {
        self.completed += 1;
        if self.enabled {
            println!("⊚ Skipping {} ({})", name, reason);
        }
    }

    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        let elapsed = self.start_time.elapsed();
        println!("\n{}", "=".repeat(60));
        println!("Summary:");
        println!("  Steps:     {}", self.total);
        println!("  Succeeded: {}", self.completed);
        println!("  Failed:    {}", self.failed);
        println!("  Duration:  {:.2}s", elapsed.as_secs_f64());
        println!("{}", "=".repeat(60));
    }
}
