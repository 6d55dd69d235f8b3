mod settings;

pub use settings::{
    ChannelSettings, EmailSettings, LogSettings, PushSettings, Settings, SmsSettings,
};
