use serde::Serialize;

/// A read-only backend collection consumed by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Appointments,
    Staffs,
    Devices,
    Patients,
    Medicines,
    Schedule,
}

impl Resource {
    /// Every dashboard collection, in the order requests are issued.
    pub const DASHBOARD: [Resource; 6] = [
        Resource::Appointments,
        Resource::Staffs,
        Resource::Devices,
        Resource::Patients,
        Resource::Medicines,
        Resource::Schedule,
    ];

    /// Path relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Appointments => "appointments/",
            Resource::Staffs => "staffs/",
            Resource::Devices => "device/",
            Resource::Patients => "patients/",
            Resource::Medicines => "medicines/",
            Resource::Schedule => "schedule/",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
