use serde::Deserialize;

use crate::domain::subscriber_email::SubscriberEmail;

#[derive(Debug)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
}

/// Raw subscription payload, before any validation has run.
///
/// `email` is optional so a missing field surfaces as a field-level
/// validation error instead of a deserialization failure. Unknown extra
/// fields are ignored.
#[derive(Deserialize)]
pub struct SubscribeBody {
    pub email: Option<String>,
}

impl TryFrom<SubscribeBody> for NewSubscriber {
    type Error = String;

    fn try_from(body: SubscribeBody) -> Result<Self, Self::Error> {
        let email = match body.email {
            Some(email) => SubscriberEmail::parse(email)?,
            None => return Err(String::from("email is required")),
        };

        Ok(NewSubscriber { email })
    }
}
