pub mod job;
pub mod salary;

pub use job::{JobDetail, JobPost, JobSummary};
pub use salary::{SalaryDoc, SalaryInfo, SalaryRecord};
