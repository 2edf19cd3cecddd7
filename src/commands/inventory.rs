use std::io::{self, Write};

use tracing::{error, info};

use crate::daemon::Cycle;
use crate::error::AppError;
use crate::hardware::types::HardwareSnapshot;
use crate::hardware::{collect_snapshot, prepare_environment, verify_environment};
use crate::render::{render, render_json, FormatSelector, ACCEPTED_FORMATS};

/// One collect+render pass: prepare the environment, take a snapshot,
/// render it in the selected format.
pub struct InventoryCycle {
    format: Option<FormatSelector>,
    collect: fn() -> HardwareSnapshot,
    prepare: fn() -> Result<(), AppError>,
}

impl InventoryCycle {
    pub fn new(format: Option<FormatSelector>) -> Self {
        Self {
            format,
            collect: collect_snapshot,
            prepare: prepare_environment,
        }
    }

    /// For the daemon loop: the environment was pinned before the runtime
    /// started, so each cycle only checks it.
    pub fn pinned(format: Option<FormatSelector>) -> Self {
        Self {
            prepare: verify_environment,
            ..Self::new(format)
        }
    }

    /// An environment failure is returned only after the snapshot has been
    /// rendered. With no format the JSON document goes to the log instead.
    pub fn run_to<W: Write>(&self, out: &mut W) -> Result<(), AppError> {
        if let Some(FormatSelector::Unsupported(raw)) = &self.format {
            info!("Unsupported output format: {}", raw);
            writeln!(out, "{}", ACCEPTED_FORMATS)?;
            return Ok(());
        }

        let prepared = (self.prepare)();
        if let Err(e) = &prepared {
            error!("{}", e);
        }

        let snapshot = (self.collect)();
        match &self.format {
            Some(format) => {
                let output = render(&snapshot, format)?;
                writeln!(out, "{}", output)?;
                out.flush()?;
            }
            None => info!("{}", render_json(&snapshot)?),
        }

        prepared
    }
}

impl Cycle for InventoryCycle {
    fn run(&self) -> Result<(), AppError> {
        self.run_to(&mut io::stdout().lock())
    }
}

pub fn handle_inventory_command(format: &FormatSelector) -> Result<(), AppError> {
    InventoryCycle::new(Some(format.clone())).run()
}
