pub mod classroom;
pub mod common;
pub mod course;
pub mod dashboard;
pub mod schedule;
pub mod student;
pub mod teacher;

pub use classroom::{Classroom, ClassroomUpdate, TeacherRef};
pub use common::{
    date_part, ClassroomStatus, Displayable, Identifiable, InputLevel, StudentStatus,
    UnknownVariant, UserRole, Weekday,
};
pub use course::Course;
pub use dashboard::{DashboardStats, StatCard};
pub use schedule::{Schedule, ScheduleCreate, ScheduleSlot, TimeSlot, TIME_SLOTS};
pub use student::{search_students, RosterSummary, Student, StudentCreate, StudentUpdate};
pub use teacher::{Teacher, TeacherCreate, MAX_EXPERIENCE_YEARS, QUALIFICATIONS, SPECIALIZATIONS};
