//! Scripted in-memory driver used by the test suite.
//!
//! Plays the role of the firmware: a configurable catalog of attached
//! devices, fake handle allocation, and per-entry-point fault injection.
//! Every call is recorded in order, so tests can assert on the exact native
//! call sequence a session produced.

use crate::driver::DispmanxDriver;
use crate::ffi::{TvAttachedDevices, VcAlpha, VcRect, TV_MAX_ATTACHED_DISPLAYS};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;

/// One simulated attached display.
#[derive(Debug, Clone, Copy)]
pub struct MockDevice {
    pub device_id: u8,
    pub width: u32,
    pub height: u32,
}

/// Entry points that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    AttachedDevices,
    DisplaySize,
    DisplayOpen,
    UpdateStart,
    ElementAdd,
    UpdateSubmit,
    ResourceCreate,
    WriteData,
    ElementRemove,
    ResourceDelete,
}

/// A recorded native call with the arguments worth asserting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    InitHost,
    AttachedDevices,
    DisplaySize {
        device_id: u16,
    },
    DisplayOpen {
        device_id: u32,
    },
    UpdateStart {
        priority: i32,
    },
    ElementAdd {
        update: u32,
        display: u32,
        layer: i32,
        dest_rect: VcRect,
        resource: u32,
        src_rect: VcRect,
        protection: u32,
        alpha: VcAlpha,
        transform: u32,
    },
    UpdateSubmitSync {
        update: u32,
    },
    ResourceCreate {
        image_type: u32,
        width: u32,
        height: u32,
    },
    ResourceWriteData {
        resource: u32,
        image_type: u32,
        pitch: i32,
        data_len: usize,
    },
    ElementRemove {
        update: u32,
        element: u32,
    },
    ResourceDelete {
        resource: u32,
    },
}

/// Scripted driver: device catalog in, call log out.
///
/// Handles are allocated from a counter starting at 1, so they are always
/// distinct and never collide with the zero sentinel. Injected faults are
/// persistent: once injected, the entry point fails on every call.
#[derive(Debug)]
pub struct MockDriver {
    devices: Vec<MockDevice>,
    calls: RefCell<Vec<Call>>,
    faults: RefCell<HashSet<Fault>>,
    next_handle: Cell<u32>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// A driver with no attached devices.
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            calls: RefCell::new(Vec::new()),
            faults: RefCell::new(HashSet::new()),
            next_handle: Cell::new(1),
        }
    }

    /// Adds a simulated attached display.
    pub fn with_device(mut self, device_id: u8, width: u32, height: u32) -> Self {
        self.devices.push(MockDevice {
            device_id,
            width,
            height,
        });
        self
    }

    /// Makes the given entry point fail from now on.
    pub fn inject(&self, fault: Fault) {
        self.faults.borrow_mut().insert(fault);
    }

    /// The recorded call log, in call order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// How many recorded calls match `predicate`.
    pub fn count_calls(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| predicate(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn failing(&self, fault: Fault) -> bool {
        self.faults.borrow().contains(&fault)
    }

    fn allocate_handle(&self) -> u32 {
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        handle
    }
}

impl DispmanxDriver for MockDriver {
    fn init_host(&self) {
        self.record(Call::InitHost);
    }

    fn attached_devices(&self) -> (i32, TvAttachedDevices) {
        self.record(Call::AttachedDevices);
        if self.failing(Fault::AttachedDevices) {
            return (-1, TvAttachedDevices::default());
        }
        let mut display_number = [0u8; TV_MAX_ATTACHED_DISPLAYS];
        for (slot, device) in self.devices.iter().take(TV_MAX_ATTACHED_DISPLAYS).enumerate() {
            display_number[slot] = device.device_id;
        }
        let devices = TvAttachedDevices {
            num_attached: self.devices.len().min(TV_MAX_ATTACHED_DISPLAYS) as i32,
            display_number,
        };
        (0, devices)
    }

    fn display_size(&self, device_id: u16) -> (i32, u32, u32) {
        self.record(Call::DisplaySize { device_id });
        if self.failing(Fault::DisplaySize) {
            return (-1, 0, 0);
        }
        match self
            .devices
            .iter()
            .find(|d| u16::from(d.device_id) == device_id)
        {
            Some(device) => (0, device.width, device.height),
            None => (-1, 0, 0),
        }
    }

    fn display_open(&self, device_id: u32) -> u32 {
        self.record(Call::DisplayOpen { device_id });
        if self.failing(Fault::DisplayOpen) {
            return 0;
        }
        self.allocate_handle()
    }

    fn update_start(&self, priority: i32) -> u32 {
        self.record(Call::UpdateStart { priority });
        if self.failing(Fault::UpdateStart) {
            return 0;
        }
        self.allocate_handle()
    }

    fn element_add(
        &self,
        update: u32,
        display: u32,
        layer: i32,
        dest_rect: &VcRect,
        resource: u32,
        src_rect: &VcRect,
        protection: u32,
        alpha: &VcAlpha,
        transform: u32,
    ) -> u32 {
        self.record(Call::ElementAdd {
            update,
            display,
            layer,
            dest_rect: *dest_rect,
            resource,
            src_rect: *src_rect,
            protection,
            alpha: *alpha,
            transform,
        });
        if self.failing(Fault::ElementAdd) {
            return 0;
        }
        self.allocate_handle()
    }

    fn update_submit_sync(&self, update: u32) -> i32 {
        self.record(Call::UpdateSubmitSync { update });
        if self.failing(Fault::UpdateSubmit) {
            return -1;
        }
        0
    }

    fn resource_create(&self, image_type: u32, width: u32, height: u32) -> u32 {
        self.record(Call::ResourceCreate {
            image_type,
            width,
            height,
        });
        if self.failing(Fault::ResourceCreate) {
            return 0;
        }
        self.allocate_handle()
    }

    fn resource_write_data(
        &self,
        resource: u32,
        image_type: u32,
        pitch: i32,
        data: &[u8],
        _rect: &VcRect,
    ) -> i32 {
        self.record(Call::ResourceWriteData {
            resource,
            image_type,
            pitch,
            data_len: data.len(),
        });
        if self.failing(Fault::WriteData) {
            return -1;
        }
        0
    }

    fn element_remove(&self, update: u32, element: u32) -> i32 {
        self.record(Call::ElementRemove { update, element });
        if self.failing(Fault::ElementRemove) {
            return -1;
        }
        0
    }

    fn resource_delete(&self, resource: u32) -> i32 {
        self.record(Call::ResourceDelete { resource });
        if self.failing(Fault::ResourceDelete) {
            return -1;
        }
        0
    }
}
