use crate::error::{MeasureError, Result};

/// Single system-wide permission to have a measurement open.
#[derive(Debug, Default)]
pub(crate) struct ActiveSlot {
    holder: Option<String>,
}

impl ActiveSlot {
    pub fn holder(&self) -> Option<&str> {
        self.holder.as_deref()
    }

    pub fn is_held_by(&self, identifier: &str) -> bool {
        self.holder() == Some(identifier)
    }

    pub fn acquire(&mut self, identifier: &str) -> Result<()> {
        match &self.holder {
            Some(active) => Err(MeasureError::MeasurementAlreadyActive {
                active: active.clone(),
                requested: identifier.to_string(),
            }),
            None => {
                self.holder = Some(identifier.to_string());
                Ok(())
            }
        }
    }

    /// Frees the slot if `identifier` holds it. Returns whether it did.
    pub fn release(&mut self, identifier: &str) -> bool {
        if self.is_held_by(identifier) {
            self.holder = None;
            true
        } else {
            false
        }
    }
}
