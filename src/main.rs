use plexus::SphereEffect;

fn main() -> Result<(), plexus::EffectError> {
    env_logger::init();

    let count = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(150);

    SphereEffect::new().with_particle_count(count).run()
}
