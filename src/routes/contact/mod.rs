mod handler;
mod model;

pub use handler::send_contact;
pub use model::ContactUsRequest;
