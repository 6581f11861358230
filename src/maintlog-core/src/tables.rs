//! Table layouts and row conversions for ledger entities.

use maintlog_store::{
    describe_key, Column, ColumnDefinition, ColumnKind, LedgerStore, Row, StoreError, TableSchema,
};

use crate::error::MaintenanceError;
use crate::types::{Device, ServiceRecord};

/// Schema of the device table: keyed by device id.
pub fn device_schema(name: &str) -> TableSchema {
    TableSchema::new(
        name,
        vec![
            ColumnDefinition::key("DeviceId", ColumnKind::String),
            ColumnDefinition::value("PublicKey", ColumnKind::Bytes),
            ColumnDefinition::value("Owner", ColumnKind::Bytes),
            ColumnDefinition::value("Check1", ColumnKind::Bytes),
            ColumnDefinition::value("Check2", ColumnKind::Bytes),
            ColumnDefinition::value("Check3", ColumnKind::Bytes),
        ],
    )
}

/// Schema of the service table: keyed by (device id, service id).
pub fn service_schema(name: &str) -> TableSchema {
    TableSchema::new(
        name,
        vec![
            ColumnDefinition::key("DeviceId", ColumnKind::String),
            ColumnDefinition::key("ServiceId", ColumnKind::String),
            ColumnDefinition::value("Check1", ColumnKind::Bool),
            ColumnDefinition::value("Check2", ColumnKind::Bool),
            ColumnDefinition::value("Check3", ColumnKind::Bool),
            ColumnDefinition::value("SignOff", ColumnKind::Bool),
        ],
    )
}

/// Key of a device row.
pub fn device_key(device_id: &str) -> Vec<Column> {
    vec![Column::string(device_id)]
}

/// Key of a service row.
pub fn service_key(device_id: &str, service_id: &str) -> Vec<Column> {
    vec![Column::string(device_id), Column::string(service_id)]
}

/// Fetch a device row, mapping a missing row to `NotFound`.
pub(crate) fn load_device(
    store: &dyn LedgerStore,
    table: &str,
    device_id: &str,
) -> Result<Device, MaintenanceError> {
    let key = device_key(device_id);
    match store.get_row(table, &key) {
        Ok(row) => Ok(Device::from_row(table, &row)?),
        Err(e) if e.is_not_found() => Err(MaintenanceError::NotFound {
            entity: "device",
            key: describe_key(&key),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Fetch a service record, mapping a missing row (or one with an empty
/// service id) to `NotFound`.
pub(crate) fn load_record(
    store: &dyn LedgerStore,
    table: &str,
    device_id: &str,
    service_id: &str,
) -> Result<ServiceRecord, MaintenanceError> {
    let key = service_key(device_id, service_id);
    let not_found = || MaintenanceError::NotFound {
        entity: "service record",
        key: describe_key(&key),
    };
    match store.get_row(table, &key) {
        Ok(row) => {
            let record = ServiceRecord::from_row(table, &row)?;
            if record.service_id.is_empty() {
                return Err(not_found());
            }
            Ok(record)
        },
        Err(e) if e.is_not_found() => Err(not_found()),
        Err(e) => Err(e.into()),
    }
}

impl Device {
    pub(crate) fn to_row(&self) -> Row {
        Row::new(vec![
            Column::string(self.id.as_str()),
            Column::bytes(self.public_key.as_slice()),
            Column::bytes(self.owner.as_slice()),
            Column::bytes(self.check1_owner.as_slice()),
            Column::bytes(self.check2_owner.as_slice()),
            Column::bytes(self.check3_owner.as_slice()),
        ])
    }

    pub(crate) fn from_row(table: &str, row: &Row) -> Result<Self, StoreError> {
        let bytes = |i: usize| {
            row.as_bytes(i)
                .map(<[u8]>::to_vec)
                .ok_or_else(|| StoreError::schema_mismatch(table, format!("column {i} is not bytes")))
        };
        Ok(Self {
            id: row
                .as_str(0)
                .ok_or_else(|| StoreError::schema_mismatch(table, "device id is not a string"))?
                .to_string(),
            public_key: bytes(1)?,
            owner: bytes(2)?,
            check1_owner: bytes(3)?,
            check2_owner: bytes(4)?,
            check3_owner: bytes(5)?,
        })
    }
}

impl ServiceRecord {
    pub(crate) fn to_row(&self) -> Row {
        Row::new(vec![
            Column::string(self.device_id.as_str()),
            Column::string(self.service_id.as_str()),
            Column::Bool(self.check1),
            Column::Bool(self.check2),
            Column::Bool(self.check3),
            Column::Bool(self.signoff),
        ])
    }

    pub(crate) fn from_row(table: &str, row: &Row) -> Result<Self, StoreError> {
        let string = |i: usize| {
            row.as_str(i)
                .map(str::to_string)
                .ok_or_else(|| StoreError::schema_mismatch(table, format!("column {i} is not a string")))
        };
        let flag = |i: usize| {
            row.as_bool(i)
                .ok_or_else(|| StoreError::schema_mismatch(table, format!("column {i} is not a bool")))
        };
        Ok(Self {
            device_id: string(0)?,
            service_id: string(1)?,
            check1: flag(2)?,
            check2: flag(3)?,
            check3: flag(4)?,
            signoff: flag(5)?,
        })
    }
}
