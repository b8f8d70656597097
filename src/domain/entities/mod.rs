mod audit;
mod condominium;
mod device;
mod incident;
mod reference;
mod staff;
mod unit;
mod visit;

pub use audit::AuditEntry;
pub use condominium::Condominium;
pub use device::{Device, DeviceBinding, OfflineBinding};
pub use incident::{append_incident_note, Incident};
pub use reference::{ServiceType, VisitType};
pub use staff::Staff;
pub use unit::{Resident, Unit, UnitWithResidents};
pub use visit::{ApprovalMode, NewVisit, Visit, VisitUpdate};
