pub mod cred_offer;
pub mod cred_request;
pub mod credential;
pub mod master_secret;
pub mod nonce;
pub mod pres_request;
pub mod presentation;
pub mod rev_state;
