//! Relay output adapter.
//!
//! Drives each actuator slot from a single digital output through the
//! `embedded-hal` [`OutputPin`] trait.  Binary slots map to the pin state;
//! power-gated leveled slots map their power switch to it.  Level selection
//! needs more than one wire and is not supported here.

use embedded_hal::digital::{Error as _, OutputPin};
use log::warn;

use crate::app::ports::ActuatorPort;
use crate::control::Actuator;

pub struct RelayActuators<P: OutputPin> {
    humidifier: Option<P>,
    ventilation: Option<P>,
}

impl<P: OutputPin> RelayActuators<P> {
    pub fn new(humidifier: Option<P>, ventilation: Option<P>) -> Self {
        Self {
            humidifier,
            ventilation,
        }
    }

    fn drive(&mut self, actuator: Actuator, on: bool) {
        let pin = match actuator {
            Actuator::Humidifier => self.humidifier.as_mut(),
            Actuator::Ventilation => self.ventilation.as_mut(),
        };
        let Some(pin) = pin else {
            warn!("{} has no relay pin", actuator);
            return;
        };
        let result = if on { pin.set_high() } else { pin.set_low() };
        if let Err(e) = result {
            warn!("{} relay write failed: {:?}", actuator, e.kind());
        }
    }

    /// Give the pins back, e.g. to park them on shutdown.
    pub fn release(self) -> (Option<P>, Option<P>) {
        (self.humidifier, self.ventilation)
    }
}

impl<P: OutputPin> ActuatorPort for RelayActuators<P> {
    fn set_state(&mut self, actuator: Actuator, on: bool) {
        self.drive(actuator, on);
    }

    fn set_level(&mut self, actuator: Actuator, level: &str) {
        warn!("{} level '{}' ignored: relay output has no levels", actuator, level);
    }

    fn set_power(&mut self, actuator: Actuator, on: bool) {
        self.drive(actuator, on);
    }
}
