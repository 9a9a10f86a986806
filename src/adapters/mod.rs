//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to                   |
//! |------------|---------------------|-------------------------------|
//! | `log_sink` | EventSink           | `log` facade                  |
//! | `sim`      | MeasurementHardware | Simulated ADC, DACs, GPIO     |
//! |            | PanelPort           | In-memory front panel         |
//! |            | EventSink           | Event recorder                |
//! |            | ParameterPort       | In-memory parameter record    |

pub mod log_sink;
pub mod sim;
