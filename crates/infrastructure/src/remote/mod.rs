pub mod firebase;

pub use firebase::FirebaseRestStore;
