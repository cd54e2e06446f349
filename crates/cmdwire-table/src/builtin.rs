//! Built-in descriptors for the vehicle protocol.
//!
//! The full protocol has thousands of commands generated from XML; this table
//! carries the commonly handled slice. Applications extend it with
//! [`CommandTable::extend`] or their own [`command_table!`] invocation.

use std::sync::{Arc, OnceLock};

use crate::table::CommandTable;

/// Declare descriptors grouped by feature and class.
///
/// Each command line is `cmd` or `list` (list items carry a leading flags
/// byte), the command id, its name, then the argument list. Enum arguments may
/// name their codes in brackets.
///
/// ```
/// use cmdwire_table::{command_table, CommandIdentity};
///
/// let descriptors = command_table! {
///     feature 1 "ardrone3" {
///         class 4 "PilotingState" {
///             cmd 1 "FlyingStateChanged" (state: Enum [landed = 0, flying = 3]);
///         }
///     }
/// };
/// assert_eq!(descriptors[0].identity, CommandIdentity::new(1, 4, 1));
/// assert_eq!(descriptors[0].name, "ardrone3.PilotingState.FlyingStateChanged");
/// ```
#[macro_export]
macro_rules! command_table {
    (@is_list cmd) => { false };
    (@is_list list) => { true };
    (
        $(
            feature $fid:literal $fname:literal {
                $(
                    class $clid:literal $clname:literal {
                        $(
                            $kind:ident $cmid:literal $cmname:literal (
                                $(
                                    $arg:ident : $tag:ident
                                    $( [ $( $en:ident = $ev:literal ),* $(,)? ] )?
                                ),* $(,)?
                            );
                        )*
                    }
                )*
            }
        )*
    ) => {{
        let mut descriptors: ::std::vec::Vec<$crate::CommandDescriptor> = ::std::vec::Vec::new();
        $( $( $(
            descriptors.push(
                $crate::CommandDescriptor::new(
                    $crate::CommandIdentity::new($fid, $clid, $cmid),
                    concat!($fname, ".", $clname, ".", $cmname),
                )
                .list_item_if($crate::command_table!(@is_list $kind))
                $(
                    .arg(
                        $crate::ArgumentDescriptor::new(
                            stringify!($arg),
                            $crate::ArgumentTypeTag::$tag,
                        )
                        $( .with_enumerators(&[ $( (stringify!($en), $ev) ),* ]) )?
                    )
                )*
            );
        )* )* )*
        descriptors
    }};
}

/// Build a fresh copy of the built-in table.
pub fn builtin() -> CommandTable {
    CommandTable::from_descriptors(builtin_descriptors())
        .expect("built-in command table must not contain duplicates")
}

/// Process-wide shared built-in table, built on first use.
pub fn builtin_shared() -> Arc<CommandTable> {
    static TABLE: OnceLock<Arc<CommandTable>> = OnceLock::new();
    Arc::clone(TABLE.get_or_init(|| Arc::new(builtin())))
}

fn builtin_descriptors() -> Vec<crate::CommandDescriptor> {
    command_table! {
        feature 0 "common" {
            class 0 "Network" {
                cmd 0 "Disconnect" ();
            }
            class 1 "NetworkEvent" {
                cmd 0 "Disconnection" (cause: Enum [off_button = 0, unknown = 1]);
            }
            class 2 "Settings" {
                cmd 0 "AllSettings" ();
                cmd 1 "Reset" ();
                cmd 2 "ProductName" (name: String);
                cmd 3 "Country" (code: String);
                cmd 4 "AutoCountry" (automatic: U8);
            }
            class 3 "SettingsState" {
                cmd 0 "AllSettingsChanged" ();
                cmd 1 "ResetChanged" ();
                cmd 2 "ProductNameChanged" (name: String);
                cmd 3 "ProductVersionChanged" (software: String, hardware: String);
                cmd 4 "ProductSerialHighChanged" (high: String);
                cmd 5 "ProductSerialLowChanged" (low: String);
                cmd 6 "CountryChanged" (code: String);
                cmd 7 "AutoCountryChanged" (automatic: U8);
            }
            class 4 "Common" {
                cmd 0 "AllStates" ();
                cmd 1 "CurrentDate" (date: String);
                cmd 2 "CurrentTime" (time: String);
                cmd 3 "Reboot" ();
                cmd 4 "CurrentDateTime" (datetime: String);
            }
            class 5 "CommonState" {
                cmd 0 "AllStatesChanged" ();
                cmd 1 "BatteryStateChanged" (percent: U8);
                list 2 "MassStorageStateListChanged" (mass_storage_id: U8, name: String);
                list 3 "MassStorageInfoStateListChanged" (
                    mass_storage_id: U8,
                    size: U32,
                    used_size: U32,
                    plugged: U8,
                    full: U8,
                    internal: U8,
                );
                cmd 4 "CurrentDateChanged" (date: String);
                cmd 5 "CurrentTimeChanged" (time: String);
                cmd 7 "WifiSignalChanged" (rssi: I16);
                cmd 8 "SensorsStatesListChanged" (
                    sensor_name: Enum [imu = 0, barometer = 1, ultrasound = 2, gps = 3, magnetometer = 4, vertical_camera = 5],
                    sensor_state: U8,
                );
                cmd 9 "ProductModel" (model: Enum [rolling_spider = 0, airborne_night = 1, airborne_cargo = 2]);
                list 10 "CountryListKnown" (country_codes: String);
                cmd 11 "DeprecatedMassStorageContentChanged" (
                    mass_storage_id: U8,
                    nb_photos: U16,
                    nb_videos: U16,
                    nb_puds: U16,
                    nb_crash_logs: U16,
                );
                cmd 13 "BootId" (boot_id: String);
            }
            class 18 "ARLibsVersionsState" {
                cmd 0 "ControllerLibARCommandsVersion" (version: String);
            }
        }
        feature 1 "ardrone3" {
            class 0 "Piloting" {
                cmd 0 "FlatTrim" ();
                cmd 1 "TakeOff" ();
                cmd 2 "PCMD" (
                    flag: U8,
                    roll: I8,
                    pitch: I8,
                    yaw: I8,
                    gaz: I8,
                    timestamp_and_seq_num: U32,
                );
                cmd 3 "Landing" ();
                cmd 4 "Emergency" ();
                cmd 5 "NavigateHome" (start: U8);
                cmd 6 "AutoTakeOffMode" (state: U8);
                cmd 7 "moveBy" (d_x: Float, d_y: Float, d_z: Float, d_psi: Float);
                cmd 8 "UserTakeOff" (state: U8);
                cmd 10 "moveTo" (
                    latitude: Double,
                    longitude: Double,
                    altitude: Double,
                    orientation_mode: Enum [none = 0, to_target = 1, heading_start = 2, heading_during = 3],
                    heading: Float,
                );
                cmd 11 "CancelMoveTo" ();
                cmd 12 "StartPilotedPOI" (latitude: Double, longitude: Double, altitude: Double);
                cmd 13 "StopPilotedPOI" ();
            }
            class 1 "Camera" {
                cmd 0 "Orientation" (tilt: I8, pan: I8);
                cmd 1 "OrientationV2" (tilt: Float, pan: Float);
                cmd 2 "Velocity" (tilt: Float, pan: Float);
            }
            class 2 "PilotingSettings" {
                cmd 0 "MaxAltitude" (current: Float);
                cmd 1 "MaxTilt" (current: Float);
                cmd 2 "AbsolutControl" (on: U8);
                cmd 3 "MaxDistance" (value: Float);
                cmd 4 "NoFlyOverMaxDistance" (should_not_fly_over: U8);
                cmd 10 "BankedTurn" (value: U8);
                cmd 11 "MinAltitude" (current: Float);
            }
            class 4 "PilotingState" {
                cmd 0 "FlatTrimChanged" ();
                cmd 1 "FlyingStateChanged" (
                    state: Enum [
                        landed = 0,
                        takingoff = 1,
                        hovering = 2,
                        flying = 3,
                        landing = 4,
                        emergency = 5,
                        usertakeoff = 6,
                        motor_ramping = 7,
                        emergency_landing = 8,
                    ],
                );
                cmd 2 "AlertStateChanged" (
                    state: Enum [none = 0, user = 1, cut_out = 2, critical_battery = 3, low_battery = 4, too_much_angle = 5],
                );
                cmd 3 "NavigateHomeStateChanged" (
                    state: Enum [available = 0, in_progress = 1, unavailable = 2, pending = 3],
                    reason: Enum [user_request = 0, connection_lost = 1, low_battery = 2, finished = 3, stopped = 4, disabled = 5, enabled = 6],
                );
                cmd 4 "PositionChanged" (latitude: Double, longitude: Double, altitude: Double);
                cmd 5 "SpeedChanged" (speed_x: Float, speed_y: Float, speed_z: Float);
                cmd 6 "AttitudeChanged" (roll: Float, pitch: Float, yaw: Float);
                cmd 8 "AltitudeChanged" (altitude: Double);
                cmd 9 "GpsLocationChanged" (
                    latitude: Double,
                    longitude: Double,
                    altitude: Double,
                    latitude_accuracy: I8,
                    longitude_accuracy: I8,
                    altitude_accuracy: I8,
                );
                cmd 12 "moveToChanged" (
                    latitude: Double,
                    longitude: Double,
                    altitude: Double,
                    orientation_mode: Enum [none = 0, to_target = 1, heading_start = 2, heading_during = 3],
                    heading: Float,
                    status: Enum [running = 0, done = 1, canceled = 2, error = 3],
                );
            }
            class 6 "PilotingSettingsState" {
                cmd 0 "MaxAltitudeChanged" (current: Float, min: Float, max: Float);
                cmd 1 "MaxTiltChanged" (current: Float, min: Float, max: Float);
                cmd 2 "AbsolutControlChanged" (on: U8);
                cmd 3 "MaxDistanceChanged" (current: Float, min: Float, max: Float);
            }
            class 7 "MediaRecord" {
                cmd 2 "PictureV2" ();
                cmd 3 "VideoV2" (record: Enum [stop = 0, start = 1]);
            }
            class 8 "MediaRecordState" {
                cmd 2 "PictureStateChangedV2" (
                    state: Enum [ready = 0, busy = 1, not_available = 2],
                    error: Enum [ok = 0, unknown = 1, camera_ko = 2, memory_full = 3, low_battery = 4],
                );
                cmd 3 "VideoStateChangedV2" (
                    state: Enum [stopped = 0, started = 1, notavailable = 2],
                    error: Enum [ok = 0, unknown = 1, camera_ko = 2, memory_full = 3, low_battery = 4],
                );
            }
            class 11 "SpeedSettings" {
                cmd 0 "MaxVerticalSpeed" (current: Float);
                cmd 1 "MaxRotationSpeed" (current: Float);
                cmd 2 "HullProtection" (present: U8);
                cmd 3 "Outdoor" (outdoor: U8);
                cmd 4 "MaxPitchRollRotationSpeed" (current: Float);
            }
            class 13 "Network" {
                cmd 0 "WifiScan" (band: Enum [band_2_4ghz = 0, band_5ghz = 1, all = 2]);
                cmd 1 "WifiAuthChannel" ();
            }
            class 14 "NetworkState" {
                list 0 "WifiScanListChanged" (
                    ssid: String,
                    rssi: I16,
                    band: Enum [band_2_4ghz = 0, band_5ghz = 1],
                    channel: U8,
                );
                cmd 1 "AllWifiScanChanged" ();
                list 2 "WifiAuthChannelListChanged" (
                    band: Enum [band_2_4ghz = 0, band_5ghz = 1],
                    channel: U8,
                    in_or_out: U8,
                );
                cmd 3 "AllWifiAuthChannelChanged" ();
            }
            class 19 "SettingsState" {
                cmd 0 "ProductMotorVersionListChanged" (
                    motor_number: U8,
                    motor_type: String,
                    software: String,
                    hardware: String,
                );
                cmd 1 "ProductGPSVersionChanged" (software: String, hardware: String);
                cmd 2 "MotorErrorStateChanged" (motor_ids: U8, motor_error: Enum [no_error = 0, error_eeprom = 1, error_stalled = 2]);
                cmd 4 "MotorFlightsStatusChanged" (nb_flights: U16, last_flight_duration: U16, total_flight_duration: U32);
            }
            class 25 "CameraState" {
                cmd 0 "Orientation" (tilt: I8, pan: I8);
                cmd 2 "OrientationV2" (tilt: Float, pan: Float);
            }
            class 31 "GPSState" {
                cmd 0 "NumberOfSatelliteChanged" (number_of_satellite: U8);
                cmd 2 "HomeTypeChosenChanged" (kind: Enum [takeoff = 0, pilot = 1, first_fix = 2, followee = 3]);
            }
        }
        feature 3 "jpsumo" {
            class 0 "Piloting" {
                cmd 0 "PCMD" (flag: U8, speed: I8, turn: I8);
                cmd 1 "Posture" (posture: Enum [standing = 0, jumper = 1, kicker = 2]);
                cmd 2 "addCapOffset" (offset: Float);
            }
            class 1 "PilotingState" {
                cmd 0 "PostureChanged" (state: Enum [standing = 0, jumper = 1, kicker = 2, stuck = 3, unknown = 4]);
                cmd 1 "AlertStateChanged" (state: Enum [none = 0, critical_battery = 1, low_battery = 2]);
                cmd 2 "SpeedChanged" (speed: I8, real_speed: I16);
            }
        }
        feature 133 "skycontroller" {
            class 4 "DeviceState" {
                cmd 0 "ConnexionChanged" (
                    status: Enum [not_connected = 0, connecting = 1, connected = 2, disconnecting = 3],
                    device_name: String,
                    device_product_id: U16,
                );
            }
            class 26 "AccessoryConfigState" {
                list 0 "AccessoryConfigChanged" (
                    accessory: Enum [no_accessory = 0, std_wheels = 1, truck_wheels = 2, hull = 3],
                    accessory_state: Enum [unavailable = 0, ready = 1, in_progress = 2],
                );
            }
            class 28 "Telemetry" {
                cmd 0 "Timestamp" (timestamp: U64);
                cmd 1 "Uptime" (uptime_ms: I64);
                cmd 2 "SignalLevel" (level_dbm: I32);
            }
        }
    }
}
