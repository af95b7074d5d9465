mod checks;

pub mod contact;
pub mod course;
pub mod faq;
pub mod lab;
pub mod module;
pub mod topic;

pub use contact::{Contact, ContactFilter, NewContact, NewContactRequest};
pub use course::{
    Category, Course, CourseDetail, CourseFilter, CourseRef, Level, NewCourse, NewCourseRequest,
    UpdateCourseRequest,
};
pub use faq::{
    CourseFaqs, DeletedCourseRef, Faq, FaqFilter, FaqPurge, NewFaq, NewFaqRequest, UpdateFaqRequest,
};
pub use lab::{Lab, LabFilter, NewLab, NewLabRequest, UpdateLabRequest};
pub use module::{Module, ModuleDetail, ModuleFilter, NewModule, NewModuleRequest, UpdateModuleRequest};
pub use topic::{NewTopic, NewTopicRequest, Topic, TopicFilter, UpdateTopicRequest};
