/// Variables forwarded from `.env` into `option_env!` lookups in `config.rs`.
const FORWARDED: [&str; 6] = [
    "ALERT_WIFI_SSID",
    "ALERT_WIFI_PASS",
    "ALERT_BROKER_HOST",
    "ALERT_BROKER_PORT",
    "ALERT_CLIENT_ID",
    "ALERT_DEVICE_NAME",
];

fn main() {
    println!("cargo:rerun-if-changed=.env");
    for key in FORWARDED {
        println!("cargo:rerun-if-env-changed={key}");
    }

    // A missing .env is normal: the compiled-in defaults apply.
    if let Ok(entries) = dotenvy::dotenv_iter() {
        for (key, value) in entries.flatten() {
            if FORWARDED.contains(&key.as_str()) {
                println!("cargo:rustc-env={key}={value}");
            }
        }
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
