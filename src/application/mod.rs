pub mod transfer_routine;
