//! DCC packet interpretation
//!
//! Routes the address byte, decodes the instruction for short locomotive
//! addresses, unpacks accessory decoder addressing, and verifies the XOR
//! checksum. Malformed content never aborts a session: unexpected lengths
//! and missing trailing bytes degrade to partial or "?" annotations.

use tracing::trace;

use super::checksum::xor_checksum;
use super::types::{Annotation, Packet};

/// Instruction labels, indexed by the top three bits of the command byte.
const INSTRUCTIONS: [&str; 8] = [
    "Decoder and Consist Control Instruction",
    "Adv Instruction",
    "Speed and Direction Instruction for reverse operation",
    "Speed and Direction Instruction for forward operation",
    "F0-F4",
    "F5-F8/F9-F12",
    "Future Expansion",
    "Configuration Variable Access Instruction",
];

/// Sub-identifiers for the Future Expansion instruction.
const EXPANSION_SUBS: [&str; 32] = [
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16",
    "17", "18", "19", "20", "21", "22", "23", "24", "25", "26", "27", "28", "29", "F13-F20",
    "F21-28",
];

/// Interpret a completed packet, appending decoded-row annotations to `out`.
///
/// Packets shorter than two bytes are too short to contain an address and
/// data and are dropped silently.
pub fn interpret(packet: &Packet, out: &mut Vec<Annotation>) {
    if packet.len() < 2 {
        return;
    }
    trace!(bytes = packet.len(), start = packet[0].start(), "interpreting packet");

    let mut len = packet.len();
    let id = packet[0].value;

    // Address-byte routing. `consumed` is the index of the last byte used
    // by the address/instruction fields.
    let consumed = match id {
        0 => {
            out.push(Annotation::decoded(
                packet[0].start(),
                packet[0].end(),
                "Broadcast",
            ));
            0
        }
        1..=111 => {
            out.push(Annotation::decoded(
                packet[0].start(),
                packet[0].end(),
                format!("LocoAddr:{id}"),
            ));
            decode_instruction(packet, out)
        }
        112..=127 => {
            out.push(Annotation::decoded(
                packet[0].start(),
                packet[0].end(),
                "Service mode",
            ));
            0
        }
        128..=191 => decode_accessory(packet, out),
        192..=231 => {
            out.push(Annotation::decoded(
                packet[0].start(),
                packet[0].end(),
                "Long loco address",
            ));
            0
        }
        232..=254 => {
            out.push(Annotation::decoded(
                packet[0].start(),
                packet[0].end(),
                "Reserved",
            ));
            0
        }
        255 => {
            out.push(Annotation::decoded(
                packet[0].start(),
                packet[0].end(),
                "Idle",
            ));
            if packet[1].value == 0 {
                out.push(Annotation::decoded(
                    packet[1].start(),
                    packet[1].end(),
                    "IDLE",
                ));
                1
            } else {
                0
            }
        }
    };

    // Checksum over everything before the last byte, if any byte is left to
    // act as one.
    if consumed + 1 < len {
        let values: Vec<u8> = packet.iter().map(|b| b.value).collect();
        let computed = xor_checksum(&values[..len - 1]);
        let received = values[len - 1];
        let text = if computed == received {
            "CHECK: OK".to_string()
        } else {
            format!("CHECK: {computed}/{received}")
        };
        out.push(Annotation::decoded(
            packet[len - 1].start(),
            packet[len - 1].end(),
            text,
        ));
        len -= 1;
    }

    // Bytes between the consumed fields and the checksum are unknown.
    for byte in &packet[(consumed + 1).min(len)..len] {
        out.push(Annotation::decoded(
            byte.start(),
            byte.end(),
            format!("?: {}", byte.value),
        ));
    }
}

/// Decode the command byte following a short locomotive address. Returns
/// the index of the last consumed byte.
fn decode_instruction(packet: &Packet, out: &mut Vec<Annotation>) -> usize {
    let byte = &packet[1];
    let cmd = byte.value >> 5;
    let subcmd = byte.value & 0x1F;

    let (cmd_start, cmd_end) = byte.bit_span(0, 3);
    out.push(Annotation::decoded(
        cmd_start,
        cmd_end,
        INSTRUCTIONS[cmd as usize],
    ));

    let (sub_start, sub_end) = byte.bit_span(3, 8);
    match cmd {
        1 => {
            out.push(Annotation::decoded(sub_start, sub_end, "Adv. Operations Inst."));
            // 128-step speed packet: direction bit plus 7 speed bits in the
            // next byte.
            if subcmd == 31 && packet.len() > 2 {
                let data = &packet[2];
                let (d_start, d_end) = data.bit_span(0, 1);
                out.push(Annotation::decoded(
                    d_start,
                    d_end,
                    format!("Dir:{}", data.value >> 7),
                ));
                let (s_start, s_end) = data.bit_span(1, 8);
                out.push(Annotation::decoded(
                    s_start,
                    s_end,
                    format!("Speed:{}", data.value & 0x7F),
                ));
                return 2;
            }
        }
        4 => {
            // Function Group One: bit 0 through bit 4 map to F1..F4, F0.
            let mut text = String::new();
            for (i, f) in [1u8, 2, 3, 4, 0].iter().enumerate() {
                text.push_str(&format!("F{}:{} ", f, (subcmd >> i) & 1));
            }
            out.push(Annotation::decoded(sub_start, sub_end, text.trim_end()));
        }
        5 => {
            // Function Group Two: five consecutive functions starting at F5
            // or F9 depending on bit 4, LSB first.
            let base = if subcmd & 0x10 != 0 { 5 } else { 9 };
            let mut text = String::new();
            for i in 0..5u8 {
                text.push_str(&format!("F{}:{} ", base + i, (subcmd >> i) & 1));
            }
            out.push(Annotation::decoded(sub_start, sub_end, text.trim_end()));
        }
        6 => {
            out.push(Annotation::decoded(
                sub_start,
                sub_end,
                format!("Sub:{}", EXPANSION_SUBS[subcmd as usize]),
            ));
            // Sub-commands 30 and 31 carry F13-F20 / F21-F28 states in the
            // next byte, LSB first.
            if (subcmd == 30 || subcmd == 31) && packet.len() > 2 {
                let data = &packet[2];
                let base: u8 = if subcmd == 30 { 13 } else { 21 };
                let mut text = String::new();
                for i in 0..8u8 {
                    text.push_str(&format!("F{}:{} ", base + i, (data.value >> i) & 1));
                }
                out.push(Annotation::decoded(
                    data.start(),
                    data.end(),
                    text.trim_end(),
                ));
                return 2;
            }
        }
        _ => {}
    }

    1
}

/// Decode accessory decoder addressing (address bytes 128-191). Returns the
/// index of the last consumed byte.
fn decode_accessory(packet: &Packet, out: &mut Vec<Annotation>) -> usize {
    let b0 = &packet[0];
    let b1 = &packet[1];

    if b1.value & 0x80 == 0 {
        out.push(Annotation::decoded(
            b0.start(),
            b1.end(),
            "Accessory (Extended)",
        ));
        return 1;
    }

    // Standard accessory: six address bits in the first byte, three
    // inverted high address bits, the sub-address and the output pair in
    // the second.
    let a1 = (b0.value & 0x3F) as i32;
    let a2 = (!(b1.value >> 4) & 0x7) as i32;
    let a3 = ((b1.value >> 1) & 0x3) as i32;
    let a4 = b1.value & 0x1;
    let c = if b1.value & 0x08 != 0 { "on" } else { "off" };

    let addr = (a2 << 6) + a1;
    let linear = (((addr - 1) << 2) | a3) + 1;

    out.push(Annotation::decoded(
        b0.start(),
        b1.end(),
        format!("Accessory linear:{linear} addr:{addr} sub:{a3} A4:{a4} C:{c}"),
    ));
    1
}
