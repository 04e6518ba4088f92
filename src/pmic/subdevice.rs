/// One function block to hand to the platform's device model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subdevice<'a> {
    pub name: &'a str,
    /// Opaque board configuration passed through untouched.
    pub config: Option<&'a [u8]>,
}

impl<'a> Subdevice<'a> {
    pub const fn new(name: &'a str) -> Self {
        Self { name, config: None }
    }

    pub const fn with_config(name: &'a str, config: &'a [u8]) -> Self {
        Self {
            name,
            config: Some(config),
        }
    }
}

/// Registers function blocks with the platform during bring-up.
pub trait SubdeviceRegistrar {
    type Error: core::fmt::Debug;

    fn add_device(&mut self, name: &str, config: Option<&[u8]>) -> Result<(), Self::Error>;
}

/// Function blocks of the stock part, in registration order.
pub const DEFAULT_SUBDEVICES: &[Subdevice<'static>] = &[
    Subdevice::new("pmic-rtc"),
    Subdevice::new("pmic-onkey"),
    Subdevice::new("WLED-1"),
    Subdevice::new("WLED-2"),
    Subdevice::new("WLED-3"),
    Subdevice::new("pmic-adc"),
    Subdevice::new("pmic-wdt"),
    Subdevice::new("pmic-leds"),
    Subdevice::new("pmic-regulator"),
    Subdevice::new("pmic-tsi"),
    Subdevice::new("pmic-bat"),
];

/// Registrar for platforms that enumerate function blocks elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSubdevices;

impl SubdeviceRegistrar for NoSubdevices {
    type Error = core::convert::Infallible;

    fn add_device(&mut self, _name: &str, _config: Option<&[u8]>) -> Result<(), Self::Error> {
        Ok(())
    }
}
