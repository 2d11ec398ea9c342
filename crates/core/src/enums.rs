//! Text-valued enumerations stored on records.
//!
//! Each enum is persisted as its upper-case string value in a `TEXT` column
//! guarded by a `CHECK` constraint, and serialized to JSON the same way.

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $val)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// The stored string value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $val ),+
                }
            }

            /// All stored string values, in declaration order.
            pub fn values() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $val => Ok($name::$variant), )+
                    other => Err($crate::error::CoreError::Validation(format!(
                        "Invalid {} '{}'. Possible values: {:?}",
                        stringify!($name),
                        other,
                        Self::values()
                    ))),
                }
            }
        }
    };
}

define_text_enum! {
    /// Lifecycle of an order posted by a client.
    OrderStatus {
        OnModeration = "ON_MODERATION",
        Denied = "DENIED",
        Active = "ACTIVE",
        Waiting = "WAITING",
        Canceled = "CANCELED",
        Executing = "EXECUTING",
        Completed = "COMPLETED",
        Appeal = "APPEAL",
    }
}

define_text_enum! {
    /// Role a user plays inside a chat.
    ParticipantRole {
        Client = "CLIENT",
        Executor = "EXECUTOR",
        Moderator = "MODERATOR",
    }
}

define_text_enum! {
    MessageStatus {
        Read = "READ",
        NotRead = "NOT_READ",
    }
}

define_text_enum! {
    NotificationStatus {
        Unread = "UNREAD",
        Read = "READ",
    }
}

define_text_enum! {
    /// Payment state of a transaction, mirrored from the acquirer invoice.
    TransactionStatus {
        Created = "CREATED",
        Paid = "PAID",
        Partial = "PARTIAL",
        Canceled = "CANCELED",
    }
}

define_text_enum! {
    PaymentType {
        Singular = "SINGULAR",
        Recurrent = "RECURRENT",
    }
}

define_text_enum! {
    /// External acquirer that issued the invoice.
    TransactionProvider {
        Crypto = "CRYPTO",
        Stripe = "STRIPE",
    }
}

define_text_enum! {
    TransactionType {
        Deposit = "DEPOSIT",
        Withdrawal = "WITHDRAWAL",
    }
}

define_text_enum! {
    /// Marketplace side a user acts on: one per profile kind.
    ProfileRole {
        Client = "CLIENT",
        Executor = "EXECUTOR",
    }
}

define_text_enum! {
    Gender {
        Male = "M",
        Female = "F",
        Other = "O",
        NotSpecified = "N",
    }
}

define_text_enum! {
    /// Billing unit of an executor service price.
    TimeUnit {
        Minutely = "MINUTELY",
        Monthly = "MONTHLY",
        Weekly = "WEEKLY",
        Hourly = "HOURLY",
        Daily = "DAILY",
        HalfDay = "HALF_DAY",
        H7 = "7H",
        H6 = "6H",
        H5 = "5H",
        M180 = "180M",
        M135 = "135M",
        M120 = "120M",
        M105 = "105M",
        M90 = "90M",
        M80 = "80M",
        M75 = "75M",
        M60 = "60M",
        M50 = "50M",
        M45 = "45M",
        M40 = "40M",
        M35 = "35M",
        M30 = "30M",
        M20 = "20M",
        M15 = "15M",
    }
}

define_text_enum! {
    /// Channel used to deliver one-time codes.
    Type2fa {
        Email = "EMAIL",
        Phone = "PHONE",
    }
}

impl From<ProfileRole> for ParticipantRole {
    fn from(role: ProfileRole) -> Self {
        match role {
            ProfileRole::Client => ParticipantRole::Client,
            ProfileRole::Executor => ParticipantRole::Executor,
        }
    }
}

impl ParticipantRole {
    /// The profile kind a participant in this role must own.
    ///
    /// Moderators are added by administrators and never act through a profile.
    pub fn profile_role(self) -> Option<ProfileRole> {
        match self {
            ParticipantRole::Client => Some(ProfileRole::Client),
            ParticipantRole::Executor => Some(ProfileRole::Executor),
            ParticipantRole::Moderator => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::error::CoreError;

    #[test]
    fn parses_stored_values() {
        assert_eq!("ON_MODERATION".parse::<OrderStatus>().unwrap(), OrderStatus::OnModeration);
        assert_eq!("M".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("90M".parse::<TimeUnit>().unwrap(), TimeUnit::M90);
    }

    #[test]
    fn rejects_unknown_value() {
        let err = "SUPERVISOR".parse::<ParticipantRole>().unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("CLIENT"));
    }

    #[test]
    fn serializes_as_stored_value() {
        let json = serde_json::to_string(&MessageStatus::NotRead).unwrap();
        assert_eq!(json, "\"NOT_READ\"");
        let back: MessageStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MessageStatus::NotRead);
    }

    #[test]
    fn values_follow_declaration_order() {
        assert_eq!(ParticipantRole::values(), vec!["CLIENT", "EXECUTOR", "MODERATOR"]);
    }

    #[test]
    fn moderator_has_no_profile() {
        assert_eq!(ParticipantRole::Moderator.profile_role(), None);
        assert_eq!(
            ParticipantRole::Executor.profile_role(),
            Some(ProfileRole::Executor)
        );
    }
}
