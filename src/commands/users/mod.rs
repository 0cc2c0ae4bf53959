pub mod register_user_command;

pub use register_user_command::RegisterUserCommand;
