use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("ROUTINELY_PLANNER_URL")
            && !url.is_empty()
        {
            self.planner.base_url = url;
        }

        if let Ok(url) = std::env::var("ROUTINELY_CHANNEL_URL")
            && !url.is_empty()
        {
            self.channel.url = url;
        }

        if let Ok(email) = std::env::var("ROUTINELY_EMAIL")
            && !email.is_empty()
        {
            self.account.email = Some(email);
        }

        if let Ok(token) = std::env::var("ROUTINELY_TOKEN")
            && !token.is_empty()
        {
            self.account.token = Some(token);
        }

        if let Ok(gender) = std::env::var("ROUTINELY_GENDER")
            && !gender.is_empty()
        {
            self.profile.gender = Some(gender);
        }

        if let Ok(age_str) = std::env::var("ROUTINELY_AGE")
            && let Ok(age) = age_str.parse::<u32>()
        {
            self.profile.age = Some(age);
        }

        if let Ok(interval_str) = std::env::var("ROUTINELY_POLL_INTERVAL_MS")
            && let Ok(interval) = interval_str.parse::<u64>()
            && interval > 0
        {
            self.session.poll_interval_ms = interval;
        }
    }
}
