pub mod task;
pub mod user;

pub use task::{Task, TaskInput, TaskQuery, TaskStatus, TaskUpdate};
pub use user::{
    NewUser, PrivateProfile, PublicProfile, User, UserChanges, UserInput, UserListQuery,
    UserLookup, UserUpdate,
};
