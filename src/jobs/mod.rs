//! The four forum jobs. Each provides a mapper and a reducer-side fold.
//!
//! | Job | Mapper | Reducer |
//! |---|---|---|
//! | average length | [`AverageLengthMapper`] | [`AverageLengthFold`] |
//! | popular tags | [`TagCountMapper`] | [`top_tags`] |
//! | student times | [`PostingHourMapper`] | [`PostingHourFold`] |
//! | study groups | [`StudyGroupMapper`] | [`StudyGroupFold`] |

pub mod average_length;
pub mod popular_tags;
pub mod student_times;
pub mod study_groups;

pub use average_length::{AverageLengthFold, AverageLengthMapper, LengthStats, LengthSummary};
pub use popular_tags::{TagCount, TagCountMapper, TagEmitMode, TagTotalsFold, count_tags, local_top_n, top_tags};
pub use student_times::{AuthorHour, HourHistogram, PostingHourFold, PostingHourMapper, parse_hour};
pub use study_groups::{StudyGroupFold, StudyGroupMapper, ThreadRoster};
