use std::fmt;

/// Touch sensors in the order the touch service reports them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchSensor {
    Head,
    LArm,
    Leg,
    RArm,
    LHand,
    RHand,
    BumperBack,
    BumperFrontLeft,
    BumperFrontRight,
    HeadTouchFront,
    HeadTouchMiddle,
    HeadTouchRear,
    LHandTouchBack,
    RHandTouchBack,
    Base,
}

impl TouchSensor {
    pub const ALL: [TouchSensor; 15] = [
        TouchSensor::Head,
        TouchSensor::LArm,
        TouchSensor::Leg,
        TouchSensor::RArm,
        TouchSensor::LHand,
        TouchSensor::RHand,
        TouchSensor::BumperBack,
        TouchSensor::BumperFrontLeft,
        TouchSensor::BumperFrontRight,
        TouchSensor::HeadTouchFront,
        TouchSensor::HeadTouchMiddle,
        TouchSensor::HeadTouchRear,
        TouchSensor::LHandTouchBack,
        TouchSensor::RHandTouchBack,
        TouchSensor::Base,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TouchSensor::Head => "Head",
            TouchSensor::LArm => "LArm",
            TouchSensor::Leg => "Leg",
            TouchSensor::RArm => "RArm",
            TouchSensor::LHand => "LHand",
            TouchSensor::RHand => "RHand",
            TouchSensor::BumperBack => "Bumper/Back",
            TouchSensor::BumperFrontLeft => "Bumper/FrontLeft",
            TouchSensor::BumperFrontRight => "Bumper/FrontRight",
            TouchSensor::HeadTouchFront => "Head/Touch/Front",
            TouchSensor::HeadTouchMiddle => "Head/Touch/Middle",
            TouchSensor::HeadTouchRear => "Head/Touch/Rear",
            TouchSensor::LHandTouchBack => "LHand/Touch/Back",
            TouchSensor::RHandTouchBack => "RHand/Touch/Back",
            TouchSensor::Base => "Base",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }

    /// Position in the touch status list
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for TouchSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of the touch status list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorStatus {
    pub name: String,
    pub touched: bool,
}

impl SensorStatus {
    pub fn new(name: impl Into<String>, touched: bool) -> Self {
        Self { name: name.into(), touched }
    }
}
