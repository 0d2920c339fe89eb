//! Maintenance requests: raised by tenants, assigned by managers, worked by staff.

mod desk;
pub mod domain;
pub mod repository;
pub mod router;
mod staff;

#[cfg(test)]
mod tests;

pub use desk::{MaintenanceDesk, MaintenanceError, MaintenanceOperation, MaintenanceSnapshot};
pub use domain::{
    open_counts, AssignedWorker, MaintenanceRequest, MaintenanceRequestDraft,
    MaintenanceRequestId, NewMaintenanceRequest, Priority, RequestFilter, RequestStatus,
};
pub use repository::MaintenanceRepository;
pub use router::{maintenance_router, MaintenanceState};
pub use staff::{StaffDesk, StaffOperation, StaffSnapshot};
