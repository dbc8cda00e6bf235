//! Simulated device executor with Spanish confirmation messages.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

use chrono::{Local, NaiveTime};
use domotica_core::{Action, Command, Device, ExecutionReport, Executor, Room};

use crate::config::HomeConfig;

#[derive(Debug, Default)]
struct Simulated {
    on: BTreeMap<Device, bool>,
    rooms: BTreeMap<Device, BTreeSet<Room>>,
    muted: bool,
}

/// [`Executor`] that only pretends to drive devices.
///
/// It tracks power and mute flags of its own so it can warn about repeated
/// commands ("luz ya está encendida"), but never fails because of them.
#[derive(Debug)]
pub struct SimulatedExecutor {
    battery_percent: Option<u64>,
    clock: fn() -> NaiveTime,
    state: Mutex<Simulated>,
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new(&HomeConfig::default())
    }
}

impl SimulatedExecutor {
    /// Executor reading the battery level from `config` and the time from the local clock.
    pub fn new(config: &HomeConfig) -> Self {
        Self {
            battery_percent: config.battery_percent,
            clock: || Local::now().time(),
            state: Mutex::new(Simulated::default()),
        }
    }

    /// Builder: replace the clock used for `VER HORA`.
    pub fn with_clock(mut self, clock: fn() -> NaiveTime) -> Self {
        self.clock = clock;
        self
    }

    fn query(&self, device: Device) -> ExecutionReport {
        match device {
            Device::Hora => {
                let now = (self.clock)().format("%H:%M");
                ExecutionReport::ok(format!("La hora actual es {now}"))
            }
            Device::Bateria => match self.battery_percent {
                Some(p) => ExecutionReport::ok(format!("La batería está al {p} por ciento")),
                None => ExecutionReport::failed("No pude obtener el nivel de batería"),
            },
            other => ExecutionReport::failed(format!("No hay información de {}", other.dsl_name())),
        }
    }

    fn track(&self, command: &Command) {
        let mut sim = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let device = command.device;
        match command.action {
            Action::Encender | Action::Apagar => {
                let on = command.action == Action::Encender;
                let already = match command.room {
                    Some(r) => sim.rooms.get(&device).is_some_and(|s| s.contains(&r)) == on,
                    None => sim.on.get(&device).copied().unwrap_or(false) == on,
                };
                if already {
                    tracing::warn!(
                        "{} ya está {}",
                        device.dsl_name(),
                        power_label(device, on)
                    );
                }
                sim.on.insert(device, on);
                if let Some(r) = command.room {
                    let rooms = sim.rooms.entry(device).or_default();
                    if on {
                        rooms.insert(r);
                    } else {
                        rooms.remove(&r);
                    }
                }
            }
            Action::Silenciar | Action::Activar if device == Device::Volumen => {
                let mute = command.action == Action::Silenciar;
                if sim.muted == mute {
                    tracing::warn!(
                        "volumen ya está {}",
                        if mute { "silenciado" } else { "activo" }
                    );
                }
                sim.muted = mute;
            }
            _ => {}
        }
    }
}

impl Executor for SimulatedExecutor {
    fn execute(&self, command: &Command) -> ExecutionReport {
        tracing::info!(%command, "executing");
        if command.action == Action::Ver {
            return self.query(command.device);
        }
        self.track(command);
        ExecutionReport::ok(message(command))
    }
}

fn power_label(device: Device, on: bool) -> &'static str {
    match (device == Device::Luz, on) {
        (true, true) => "encendida",
        (true, false) => "apagada",
        (false, true) => "encendido",
        (false, false) => "apagado",
    }
}

fn message(command: &Command) -> String {
    let action = command.action.dsl_name();
    let place = command
        .room
        .map(|r| format!(" en {}", r.label()))
        .unwrap_or_default();
    match (command.device, command.action) {
        (Device::Volumen, Action::Ajustar) => {
            format!("Volumen ajustado a {}", command.value.unwrap_or_default())
        }
        (Device::Volumen, Action::Silenciar) => "Volumen silenciado".into(),
        (Device::Volumen, Action::Activar) => "Volumen activado".into(),
        (Device::Volumen, _) => format!("Volumen {action}"),
        (Device::Brillo, Action::Ajustar) => {
            format!("Brillo ajustado a {}", command.value.unwrap_or_default())
        }
        (Device::Brillo, _) => format!("Brillo {action}"),
        (Device::Luz, Action::Encender) => format!("Encendiendo luz{place}"),
        (Device::Luz, Action::Apagar) => format!("Apagando luz{place}"),
        (Device::Luz, Action::Subir) => "Subiendo intensidad de luz".into(),
        (Device::Luz, Action::Bajar) => "Bajando intensidad de luz".into(),
        (Device::Televisor, Action::Encender) => format!("Encendiendo televisor{place}"),
        (Device::Televisor, Action::Apagar) => format!("Apagando televisor{place}"),
        (d @ (Device::Luz | Device::Televisor), _) => {
            format!("Control de {} {action} completado", d.dsl_name())
        }
        (d, _) => format!("{} {}{place}", capitalize(&action), d.dsl_name()),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
