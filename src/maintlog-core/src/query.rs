//! Read-only projections.
//!
//! Queries carry no caller evidence and are open to anyone. Results are
//! JSON: one object per entity, arrays for lists.

use serde::Serialize;
use tracing::debug;

use crate::error::MaintenanceError;
use crate::registry::DeviceRegistry;
use crate::service_cycle::ServiceCycle;

/// JSON views over devices and service records.
#[derive(Debug, Clone, Copy)]
pub struct QueryFacade<'a> {
    registry: DeviceRegistry<'a>,
    cycle: ServiceCycle<'a>,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, MaintenanceError> {
    Ok(serde_json::to_vec(value)?)
}

impl<'a> QueryFacade<'a> {
    /// Façade over a registry and a state machine sharing one store.
    pub fn new(registry: DeviceRegistry<'a>, cycle: ServiceCycle<'a>) -> Self {
        Self { registry, cycle }
    }

    /// One device.
    pub fn device(&self, device_id: &str) -> Result<Vec<u8>, MaintenanceError> {
        to_json(&self.registry.get(device_id)?)
    }

    /// Every device.
    pub fn devices(&self) -> Result<Vec<u8>, MaintenanceError> {
        let devices = self.registry.get_all()?.collect::<Result<Vec<_>, _>>()?;
        debug!(count = devices.len(), "Listed devices");
        to_json(&devices)
    }

    /// One service record.
    pub fn device_service_record(
        &self,
        device_id: &str,
        service_id: &str,
    ) -> Result<Vec<u8>, MaintenanceError> {
        to_json(&self.cycle.record(device_id, service_id)?)
    }

    /// Service records of one device. An empty id selects every device.
    pub fn device_service_records(&self, device_id: &str) -> Result<Vec<u8>, MaintenanceError> {
        let filter = (!device_id.is_empty()).then_some(device_id);
        let records = self.cycle.records(filter)?.collect::<Result<Vec<_>, _>>()?;
        debug!(count = records.len(), device_id, "Listed service records");
        to_json(&records)
    }

    /// Every service record.
    pub fn all_service_records(&self) -> Result<Vec<u8>, MaintenanceError> {
        self.device_service_records("")
    }
}
