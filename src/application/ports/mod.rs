pub mod principal_repo;
