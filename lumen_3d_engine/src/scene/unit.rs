/// Units - the pieces of application logic driven by the frame loop.
///
/// A unit reacts once per frame (`respond`) and then draws (`draw`). Units
/// are created at startup from an explicit `UnitRegistry`, in the order
/// they were registered, and receive the `Render` façade they work with.

use crate::error::{Error, Result};
use crate::render::Render;
use crate::timer::FrameTime;

/// Per-frame behavior plugged into `Render::render_frame`
pub trait Unit {
    /// Update state for the current frame
    fn respond(&mut self, _render: &mut Render, _time: &FrameTime) -> Result<()> {
        Ok(())
    }

    /// Issue draw calls; runs between pipeline start and end
    fn draw(&mut self, _render: &mut Render) -> Result<()> {
        Ok(())
    }
}

type UnitFactory = Box<dyn FnOnce(&mut Render) -> Result<Box<dyn Unit>>>;

/// Ordered list of unit factories, resolved once by `build`
///
/// ```ignore
/// let mut units = UnitRegistry::new()
///     .register("ground", |render| Ok(Box::new(Ground::new(render)?) as Box<dyn Unit>))
///     .register("rain", |render| Ok(Box::new(Rain::new(render)?) as Box<dyn Unit>))
///     .build(&mut render)?;
/// ```
#[derive(Default)]
pub struct UnitRegistry {
    factories: Vec<(String, UnitFactory)>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, name: &str, factory: F) -> Self
    where
        F: FnOnce(&mut Render) -> Result<Box<dyn Unit>> + 'static,
    {
        self.factories.push((name.to_string(), Box::new(factory)));
        self
    }

    /// Registered names, in creation order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Create every unit in registration order
    ///
    /// Stops at the first factory that fails.
    pub fn build(self, render: &mut Render) -> Result<Vec<Box<dyn Unit>>> {
        let mut units = Vec::with_capacity(self.factories.len());
        for (name, factory) in self.factories {
            let unit = factory(render)
                .map_err(|e| Error::InitializationFailed(format!("unit '{}': {}", name, e)))?;
            crate::engine_debug!("lumen3d::UnitRegistry", "Created unit '{}'", name);
            units.push(unit);
        }
        Ok(units)
    }
}

#[cfg(test)]
#[path = "unit_tests.rs"]
mod tests;
