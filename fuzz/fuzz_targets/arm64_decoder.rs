#![no_main]

use libfuzzer_sys::fuzz_target;
use armlens_disasm::arm64::{DecodeTable, OperandMode};
use armlens_disasm::{Arm64Disassembler, Disassembler, ErrorKind};

fuzz_target!(|data: &[u8]| {
    let eager = Arm64Disassembler::new();
    let deferred = Arm64Disassembler::new().with_operand_mode(OperandMode::Deferred);
    let table = DecodeTable::get();

    let block = eager.disassemble_block(data, 0x1000);
    assert_eq!(block.len(), data.len().div_ceil(4));

    for (i, chunk) in data.chunks_exact(4).take(100).enumerate() {
        let address = 0x1000 + 4 * i as u64;
        let a = eager.decode_instruction(chunk, address).unwrap();
        let b = deferred.decode_instruction(chunk, address).unwrap();

        // ARM64 instructions are always 4 bytes
        assert_eq!(a.size(), 4);
        assert_eq!(a.word, u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        assert_eq!(a.operands(), b.operands());
        assert!(table.entries().iter().filter(|e| e.matches(a.word)).count() <= 1);
        assert_eq!(
            a.reason() == Some(ErrorKind::UnknownEncoding),
            table.lookup(a.word).is_none()
        );
        assert_eq!(a.access(), b.access());
        if let Some(format) = a.format {
            assert!(format.operand_range().contains(&a.operands().len()));
            assert_eq!(a.access().len(), a.operands().len());
        }
        let _ = a.to_string();
    }
});
