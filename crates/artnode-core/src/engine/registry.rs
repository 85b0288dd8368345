use crate::protocols::artnet::{TodScope, Uid};

/// Source of downstream RDM device identifiers for ArtTodData replies.
pub trait DeviceRegistry {
    /// Known devices on `net`, limited to changes when `scope` asks for it.
    fn devices(&self, net: u8, scope: TodScope) -> Vec<Uid>;
}

/// Registry for nodes without RDM-capable outputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDevices;

impl DeviceRegistry for NoDevices {
    fn devices(&self, _net: u8, _scope: TodScope) -> Vec<Uid> {
        Vec::new()
    }
}

/// Fixed device list, typically loaded from the node setup file.
///
/// A static table never changes, so a `Changed` request yields nothing.
#[derive(Debug, Clone, Default)]
pub struct StaticDeviceRegistry {
    uids: Vec<Uid>,
}

impl StaticDeviceRegistry {
    pub fn new(mut uids: Vec<Uid>) -> Self {
        uids.sort();
        uids.dedup();
        Self { uids }
    }

    pub fn uids(&self) -> &[Uid] {
        &self.uids
    }
}

impl DeviceRegistry for StaticDeviceRegistry {
    fn devices(&self, _net: u8, scope: TodScope) -> Vec<Uid> {
        match scope {
            TodScope::Full => self.uids.clone(),
            TodScope::Changed => Vec::new(),
        }
    }
}

impl<R: DeviceRegistry + ?Sized> DeviceRegistry for &R {
    fn devices(&self, net: u8, scope: TodScope) -> Vec<Uid> {
        (**self).devices(net, scope)
    }
}
